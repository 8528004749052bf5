//! Data model for the document: linear items, elements, annotations,
//! the linear data store and the document itself.

pub mod annotations;
pub mod document;
pub mod element;
pub mod item;
pub mod linear;
pub mod registry;

use thiserror::Error;

/// Errors raised while building or validating the document model
///
/// These are distinct from [`crate::tree::TreeSyncError`]: model errors
/// occur before any mutation starts (malformed input), while tree-sync
/// errors are fatal contract violations during a modification pass.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// A close marker did not match the innermost open element
    #[error("unbalanced close marker: expected {expected:?}, found {found:?}")]
    UnbalancedClose { expected: Option<String>, found: String },

    /// An open marker was never closed
    #[error("unclosed element: {0}")]
    UnclosedElement(String),

    /// An element type is not present in the node registry
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// A child was placed under a node that cannot contain it
    #[error("node {parent} cannot contain {child}")]
    InvalidChild { parent: String, child: String },

    /// Metadata array length diverged from the linear item array length
    #[error("metadata length {metadata} does not match data length {data}")]
    MetadataLengthMismatch { metadata: usize, data: usize },
}
