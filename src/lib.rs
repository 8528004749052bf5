//! Rich-text document model with transactional tree synchronization
//!
//! This crate keeps two representations of an editable document in sync:
//! a flat linear model (text units and open/close structural markers) and
//! an in-memory tree of typed nodes with cached lengths. Transactions
//! describe edits as a diff over the linear model; the tree modifier
//! applies them incrementally, preserving node identity for untouched
//! subtrees.

pub mod models;
pub mod transaction;
pub mod tree;

// Re-export commonly used types
pub use models::annotations::{Annotation, AnnotationId, AnnotationStore};
pub use models::document::Document;
pub use models::element::Element;
pub use models::item::{LinearItem, MetaSlot};
pub use models::linear::{LinearData, UndoSplice};
pub use models::registry::{NodeRegistry, NodeSpec};
pub use models::ModelError;
pub use transaction::{Operation, Transaction};
pub use tree::cursor::{Step, StepKind, TreeCursor};
pub use tree::modifier::TreeModifier;
pub use tree::{DocumentTree, Node, NodeId, TreeSyncError};
