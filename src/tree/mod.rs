//! Document tree: arena-backed node storage, cursors and the modifier
//!
//! The tree mirrors the linear data: branch nodes own ordered children,
//! text nodes carry only a cached length (their characters live solely
//! in the linear store), and leaf nodes (image, alien) are childless
//! elements. Nodes are addressed by stable [`NodeId`] handles into an
//! arena, so node identity survives any amount of re-parenting.

pub mod cursor;
mod error;
pub mod modifier;

pub use error::TreeSyncError;

use crate::models::element::Element;
use crate::models::registry::NodeRegistry;

/// Stable handle to a node in the arena
///
/// Identity comparisons on ids are identity comparisons on nodes;
/// detaching and re-attaching a node keeps its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Structural kind of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Ordered, exclusively owned child nodes
    Branch { children: Vec<NodeId> },
    /// A text run; characters live in the linear data
    Text,
    /// Childless element node (image, alien block)
    Leaf,
}

/// One document tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    /// The element this node was built from; None for text nodes
    pub element: Option<Element>,
    /// Cached content length in linear units
    pub length: usize,
    /// Whether open/close markers wrap this node in the linear data
    pub wrapped: bool,
    pub parent: Option<NodeId>,
}

impl Node {
    /// Content length plus the two marker positions, if wrapped
    pub fn outer_length(&self) -> usize {
        if self.wrapped {
            self.length + 2
        } else {
            self.length
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text)
    }

    /// Whether this node can hold child nodes
    pub fn can_have_children(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    /// Type tag for diagnostics; text nodes report "text"
    pub fn type_name(&self) -> &str {
        self.element
            .as_ref()
            .map(|e| e.node_type.as_str())
            .unwrap_or("text")
    }
}

/// Arena-backed document tree
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DocumentTree {
    /// Create a tree holding only an empty, unwrapped document root
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Branch { children: Vec::new() },
            element: Some(Element::new("document")),
            length: 0,
            wrapped: false,
            parent: None,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Children of a node; empty for text and leaf nodes
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.0].kind {
            NodeKind::Branch { children } => children,
            _ => &[],
        }
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn outer_length(&self, id: NodeId) -> usize {
        self.node(id).outer_length()
    }

    /// Allocate a detached text node
    pub fn new_text_node(&mut self, length: usize) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Text,
            element: None,
            length,
            wrapped: false,
            parent: None,
        })
    }

    /// Allocate a detached element node from an open-tag description
    ///
    /// The registry decides whether the type is a branch or a childless
    /// leaf; unknown types are a fatal contract violation.
    pub fn create_from_element(
        &mut self,
        element: Element,
        registry: &NodeRegistry,
    ) -> Result<NodeId, TreeSyncError> {
        let spec = registry
            .spec(&element.node_type)
            .ok_or_else(|| TreeSyncError::UnknownNodeType(element.node_type.clone()))?;
        let kind = if spec.can_have_children() {
            NodeKind::Branch { children: Vec::new() }
        } else {
            NodeKind::Leaf
        };
        let wrapped = spec.is_wrapped;
        Ok(self.alloc(Node {
            kind,
            element: Some(element),
            length: 0,
            wrapped,
            parent: None,
        }))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Splice a node's child list, re-parenting and fixing cached lengths
    ///
    /// Removed nodes are detached (parent cleared) but stay alive in the
    /// arena so their ids remain valid for re-attachment. Ancestor
    /// lengths are adjusted by the net outer-length delta.
    pub fn splice_children(
        &mut self,
        parent: NodeId,
        index: usize,
        remove: usize,
        insert: Vec<NodeId>,
    ) -> Vec<NodeId> {
        let mut delta: isize = 0;
        for id in &insert {
            delta += self.outer_length(*id) as isize;
            self.nodes[id.0].parent = Some(parent);
        }
        let removed: Vec<NodeId> = match &mut self.nodes[parent.0].kind {
            NodeKind::Branch { children } => {
                children.splice(index..index + remove, insert).collect()
            }
            _ => panic!("splice_children on non-branch node"),
        };
        for id in &removed {
            delta -= self.outer_length(*id) as isize;
            self.nodes[id.0].parent = None;
        }
        log::trace!(
            "spliced children of {:?} at {}: -{} +{} (delta {})",
            parent,
            index,
            remove,
            removed.len(),
            delta
        );
        self.adjust_length(parent, delta);
        removed
    }

    /// Adjust a node's cached content length, propagating to ancestors
    pub fn adjust_length(&mut self, id: NodeId, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.0];
            node.length = (node.length as isize + delta) as usize;
            current = node.parent;
        }
    }

    /// Depth-first structural comparison of two subtrees
    ///
    /// Compares type, attributes, kind and cached length; node identity
    /// is deliberately ignored.
    pub fn subtree_equals(&self, id: NodeId, other: &DocumentTree, other_id: NodeId) -> bool {
        let a = self.node(id);
        let b = other.node(other_id);
        if a.element != b.element || a.length != b.length || a.wrapped != b.wrapped {
            return false;
        }
        match (&a.kind, &b.kind) {
            (NodeKind::Text, NodeKind::Text) | (NodeKind::Leaf, NodeKind::Leaf) => true,
            (NodeKind::Branch { children: ca }, NodeKind::Branch { children: cb }) => {
                ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb.iter())
                        .all(|(x, y)| self.subtree_equals(*x, other, *y))
            }
            _ => false,
        }
    }

    /// Scan the whole tree for two adjacent sibling text nodes
    ///
    /// The modifier merges text nodes eagerly, so this must never find
    /// any; exposed for tests and debug assertions.
    pub fn has_adjacent_text_siblings(&self) -> bool {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            for pair in children.windows(2) {
                if self.node(pair[0]).is_text() && self.node(pair[1]).is_text() {
                    return true;
                }
            }
            stack.extend_from_slice(children);
        }
        false
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_children_updates_lengths() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let para = tree
            .create_from_element(Element::new("paragraph"), &NodeRegistry::new())
            .unwrap();
        let text = tree.new_text_node(3);
        tree.splice_children(para, 0, 0, vec![text]);
        assert_eq!(tree.node(para).length, 3);
        assert_eq!(tree.node(para).outer_length(), 5);
        tree.splice_children(root, 0, 0, vec![para]);
        assert_eq!(tree.node(root).length, 5);
        assert_eq!(tree.node(root).outer_length(), 5);
    }

    #[test]
    fn test_adjust_length_propagates() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let para = tree
            .create_from_element(Element::new("paragraph"), &NodeRegistry::new())
            .unwrap();
        let text = tree.new_text_node(2);
        tree.splice_children(para, 0, 0, vec![text]);
        tree.splice_children(root, 0, 0, vec![para]);
        tree.adjust_length(text, 4);
        assert_eq!(tree.node(text).length, 6);
        assert_eq!(tree.node(para).length, 6);
        assert_eq!(tree.node(root).length, 8);
    }

    #[test]
    fn test_detached_node_keeps_identity() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let para = tree
            .create_from_element(Element::new("paragraph"), &NodeRegistry::new())
            .unwrap();
        tree.splice_children(root, 0, 0, vec![para]);
        let removed = tree.splice_children(root, 0, 1, vec![]);
        assert_eq!(removed, vec![para]);
        assert_eq!(tree.node(para).parent, None);
        tree.splice_children(root, 0, 0, vec![para]);
        assert_eq!(tree.child_at(root, 0), Some(para));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let mut tree = DocumentTree::new();
        let err = tree
            .create_from_element(Element::new("marquee"), &NodeRegistry::new())
            .unwrap_err();
        assert!(matches!(err, TreeSyncError::UnknownNodeType(_)));
    }
}
