//! Fatal errors raised during a tree modification pass
//!
//! Every variant is a programming or data contract violation, not a
//! user-facing condition: the transaction was malformed or built
//! against stale data. None are caught internally; a failed pass may
//! leave the tree inconsistent and the caller is expected to discard or
//! roll back the document.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreeSyncError {
    /// The remover stepped past the end of the document
    #[error("remover stepped past the end of the document")]
    RemoverPastEnd,

    /// The inserter stepped past the end of the document
    #[error("inserter stepped past the end of the document")]
    InserterPastEnd,

    /// Joint retain steps consumed different lengths
    #[error("remover and inserter unexpectedly diverged")]
    CursorsDiverged,

    /// `processRemove` found different data than the operation claimed
    #[error("removed data not as expected")]
    RemovedDataMismatch,

    /// `processRemove` found different metadata than the operation claimed
    #[error("removed metadata not as expected")]
    RemovedMetadataMismatch,

    /// A subtree flagged for deletion was never confirmed removed
    #[error("unprocessed node deletions")]
    UnprocessedDeletions,

    /// A close tag's type does not match the node being closed
    #[error("expected closing for {expected}, got closing for {actual}")]
    CloseTypeMismatch { expected: String, actual: String },

    /// The cursor was asked to descend where there is nothing to enter
    #[error("cannot step into {0} node")]
    CannotStepIn(String),

    /// A child was inserted under a node that cannot hold children
    #[error("cannot add a child to {0} node")]
    CannotAddChild(String),

    /// A replace operation's metadata list length diverged from its items
    #[error("different metadata and item lengths in replace operation")]
    MetadataLengthMismatch,

    /// The inserter was found inside a text range being removed
    #[error("inserter lies in the removed range")]
    InserterInRemovedRange,

    /// Text would move backwards over the inserter within one node
    #[error("ambiguous text move within the same node")]
    AmbiguousTextMove,

    /// Text insertion would land ahead of the remover in a shared node
    #[error("cannot insert ahead of remover in same text node")]
    InsertAheadOfRemover,

    /// The remover was left in the split-off portion of a text node
    #[error("remover in split portion of text node")]
    RemoverInSplitText,

    /// An open tag named a type absent from the node registry
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// A cursor step was recorded with an unexpected kind
    #[error("expected step of type {expected}, not {actual}")]
    UnexpectedStep { expected: &'static str, actual: &'static str },
}
