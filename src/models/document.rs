//! The document: linear data, tree, annotation store and node registry
//!
//! The linear data is canonical; the tree is built from it once and
//! thereafter kept in sync incrementally by the tree modifier as
//! transactions are committed.

use super::item::LinearItem;
use super::linear::{LinearData, UndoSplice};
use super::registry::NodeRegistry;
use super::ModelError;
use crate::models::annotations::AnnotationStore;
use crate::transaction::Transaction;
use crate::tree::modifier::TreeModifier;
use crate::tree::{DocumentTree, NodeId, TreeSyncError};

/// An editable document
#[derive(Debug, Clone)]
pub struct Document {
    /// Flat sequence representation; canonical and diffable
    pub linear: LinearData,
    /// Tree representation, kept in sync with the linear data
    pub tree: DocumentTree,
    /// Interned annotation values referenced by text items
    pub store: AnnotationStore,
    /// Node-type rules and factory
    pub registry: NodeRegistry,
}

impl Document {
    /// An empty document with the built-in node types
    pub fn new() -> Self {
        Self {
            linear: LinearData::default(),
            tree: DocumentTree::new(),
            store: AnnotationStore::new(),
            registry: NodeRegistry::new(),
        }
    }

    /// Build a document from a well-formed linear sequence
    pub fn from_linear(items: Vec<LinearItem>) -> Result<Self, ModelError> {
        Self::from_parts(LinearData::new(items), AnnotationStore::new(), NodeRegistry::new())
    }

    /// Build a document from linear data, a store and a registry
    pub fn from_parts(
        linear: LinearData,
        store: AnnotationStore,
        registry: NodeRegistry,
    ) -> Result<Self, ModelError> {
        let tree = build_tree(&linear, &registry)?;
        Ok(Self {
            linear,
            tree,
            store,
            registry,
        })
    }

    /// Apply a transaction, mutating the linear data and tree in place
    ///
    /// Creates a one-shot tree modifier, runs it to completion and
    /// returns the inverse-splice log. On error the document may be left
    /// inconsistent: this path is the last line of defense against
    /// malformed or stale transactions, not a recoverable operation.
    /// Callers needing atomicity should snapshot first, or replay the
    /// returned log (for linear content only) via
    /// [`LinearData::undo_splices`].
    pub fn commit(&mut self, transaction: &Transaction) -> Result<Vec<UndoSplice>, TreeSyncError> {
        let old_length = transaction.old_length();
        if old_length > self.linear.len() {
            return Err(TreeSyncError::RemoverPastEnd);
        }
        log::debug!(
            "committing transaction: {} operations over {} of {} items",
            transaction.operations.len(),
            old_length,
            self.linear.len()
        );
        let mut modifier = TreeModifier::new(self, transaction);
        modifier.process()?;
        Ok(modifier.into_undo_splices())
    }

    /// Total content length of the document in linear units
    pub fn len(&self) -> usize {
        self.linear.len()
    }

    pub fn is_empty(&self) -> bool {
        self.linear.is_empty()
    }

    /// Resolve a path of child indices to a node id
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let mut node = self.tree.root();
        for &index in path {
            node = self.tree.child_at(node, index)?;
        }
        Some(node)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a tree from linear data with a structural stack walk
///
/// Text runs become text nodes; open markers push element nodes built
/// through the registry; close markers pop and verify. Malformed
/// nesting, unknown types and children placed under childless or
/// type-restricted parents are all fatal.
pub fn build_tree(linear: &LinearData, registry: &NodeRegistry) -> Result<DocumentTree, ModelError> {
    let mut tree = DocumentTree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    let mut pending_text: usize = 0;

    fn flush_text(
        tree: &mut DocumentTree,
        stack: &[NodeId],
        pending_text: &mut usize,
    ) -> Result<(), ModelError> {
        if *pending_text == 0 {
            return Ok(());
        }
        let parent = stack[stack.len() - 1];
        if !tree.node(parent).can_have_children() {
            return Err(ModelError::InvalidChild {
                parent: tree.node(parent).type_name().to_string(),
                child: "text".to_string(),
            });
        }
        let index = tree.children(parent).len();
        let text = tree.new_text_node(*pending_text);
        tree.splice_children(parent, index, 0, vec![text]);
        *pending_text = 0;
        Ok(())
    }

    for item in linear.items() {
        match item {
            LinearItem::Text { .. } => pending_text += 1,
            LinearItem::Open(element) => {
                flush_text(&mut tree, &stack, &mut pending_text)?;
                registry.require(&element.node_type)?;
                let parent = stack[stack.len() - 1];
                let parent_node = tree.node(parent);
                if !parent_node.can_have_children() {
                    return Err(ModelError::InvalidChild {
                        parent: parent_node.type_name().to_string(),
                        child: element.node_type.clone(),
                    });
                }
                if let Some(spec) = registry.spec(parent_node.type_name()) {
                    if let Some(allowed) = &spec.child_node_types {
                        if !allowed.iter().any(|t| t == &element.node_type) {
                            return Err(ModelError::InvalidChild {
                                parent: parent_node.type_name().to_string(),
                                child: element.node_type.clone(),
                            });
                        }
                    }
                }
                let node = tree
                    .create_from_element(element.clone(), registry)
                    .map_err(|_| ModelError::UnknownNodeType(element.node_type.clone()))?;
                let index = tree.children(parent).len();
                tree.splice_children(parent, index, 0, vec![node]);
                stack.push(node);
            }
            LinearItem::Close(node_type) => {
                flush_text(&mut tree, &stack, &mut pending_text)?;
                let top = if stack.len() > 1 { stack.pop() } else { None };
                let Some(top) = top else {
                    return Err(ModelError::UnbalancedClose {
                        expected: None,
                        found: node_type.clone(),
                    });
                };
                let top_type = tree.node(top).type_name();
                if top_type != node_type {
                    return Err(ModelError::UnbalancedClose {
                        expected: Some(top_type.to_string()),
                        found: node_type.clone(),
                    });
                }
            }
        }
    }
    flush_text(&mut tree, &stack, &mut pending_text)?;
    if stack.len() > 1 {
        let top = stack[stack.len() - 1];
        return Err(ModelError::UnclosedElement(
            tree.node(top).type_name().to_string(),
        ));
    }
    Ok(tree)
}
