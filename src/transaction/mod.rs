//! Transactions: ordered retain/replace operations over the linear model
//!
//! A transaction describes how one linear sequence becomes another. It
//! is produced externally (by diffing); this crate only consumes it.
//! Operations are applied strictly in order and their old-side lengths
//! must tile the document (a missing tail retain is tolerated and
//! compensated by the tree modifier's implicit final retain).

use crate::models::item::{LinearItem, MetaSlot};
use serde::{Deserialize, Serialize};

/// One transaction operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Content is unchanged over this linear span
    Retain { length: usize },
    /// Remove items and insert others at the current position
    Replace {
        remove: Vec<LinearItem>,
        /// Per-item metadata removed; None = all slots empty
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remove_metadata: Option<Vec<Option<MetaSlot>>>,
        insert: Vec<LinearItem>,
        /// Per-item metadata inserted; None = all slots empty
        #[serde(default, skip_serializing_if = "Option::is_none")]
        insert_metadata: Option<Vec<Option<MetaSlot>>>,
    },
}

impl Operation {
    pub fn retain(length: usize) -> Self {
        Operation::Retain { length }
    }

    pub fn replace(remove: Vec<LinearItem>, insert: Vec<LinearItem>) -> Self {
        Operation::Replace {
            remove,
            remove_metadata: None,
            insert,
            insert_metadata: None,
        }
    }

    /// Linear length this operation consumes from the old sequence
    pub fn old_length(&self) -> usize {
        match self {
            Operation::Retain { length } => *length,
            Operation::Replace { remove, .. } => remove.len(),
        }
    }

    /// Linear length this operation contributes to the new sequence
    pub fn new_length(&self) -> usize {
        match self {
            Operation::Retain { length } => *length,
            Operation::Replace { insert, .. } => insert.len(),
        }
    }
}

/// An ordered list of operations describing one document edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub operations: Vec<Operation>,
}

impl Transaction {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Total old-side length covered by the operations
    pub fn old_length(&self) -> usize {
        self.operations.iter().map(Operation::old_length).sum()
    }

    /// Total new-side length produced by the operations
    pub fn new_length(&self) -> usize {
        self.operations.iter().map(Operation::new_length).sum()
    }

    /// Whether the transaction changes anything at all
    pub fn is_no_op(&self) -> bool {
        self.operations.iter().all(|op| match op {
            Operation::Retain { .. } => true,
            Operation::Replace { remove, insert, .. } => remove.is_empty() && insert.is_empty(),
        })
    }
}
