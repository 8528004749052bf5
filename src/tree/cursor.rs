//! Tree cursor: a stateful walker over the document tree
//!
//! A cursor tracks a tree position (node, child offset, path from the
//! root) together with the corresponding absolute linear offset, and
//! reports each step it takes. The tree modifier owns two cursors per
//! pass: the remover walks the pre-transaction tree while the inserter
//! walks the post-transaction tree being built. Each cursor carries a
//! live ignore list so it routes around nodes the other cursor has
//! claimed (pending insertions for the remover, pending deletions for
//! the inserter).

use super::{DocumentTree, NodeId, TreeSyncError};

/// Kind of step a cursor just took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Entered an element at its open marker (length 1)
    Open,
    /// Exited an element past its close marker (length 1; 0 for text)
    Close,
    /// Skipped a whole element node in one move (length = outer length)
    Cross,
    /// Consumed characters of a text node without leaving it
    CrossText,
}

impl StepKind {
    pub fn name(self) -> &'static str {
        match self {
            StepKind::Open => "open",
            StepKind::Close => "close",
            StepKind::Cross => "cross",
            StepKind::CrossText => "crosstext",
        }
    }
}

/// Record of a single cursor step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    /// Linear length the step consumed
    pub length: usize,
    /// The node involved: entered, exited, crossed, or the text node
    pub item: Option<NodeId>,
}

/// A walker over the document tree, synchronized with a linear offset
#[derive(Debug, Clone)]
pub struct TreeCursor {
    pub root: NodeId,
    /// Current node; None once the cursor has stepped out of the root
    pub node: Option<NodeId>,
    /// Stack of nodes from the root to the current node
    pub nodes: Vec<NodeId>,
    /// Child indices from the root to the current node
    pub path: Vec<usize>,
    /// Child offset within the current node (character offset in text)
    pub offset: usize,
    /// Absolute offset into the linear data
    pub linear_offset: usize,
    pub last_step: Option<Step>,
}

impl TreeCursor {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            node: Some(root),
            nodes: vec![root],
            path: Vec::new(),
            offset: 0,
            linear_offset: 0,
            last_step: None,
        }
    }

    /// Canonicalize the cursor position
    ///
    /// A cursor at the end of a text node is popped out to sit just past
    /// that node, ignored (pending) children at the cursor are skipped,
    /// and a non-empty text node at the cursor is entered. After this,
    /// two cursors at the same logical location report identical
    /// positions.
    pub fn normalize(&mut self, tree: &DocumentTree, ignore: &[NodeId]) {
        let Some(node_id) = self.node else {
            return;
        };
        // Step out of an exhausted text node
        if tree.node(node_id).is_text() && self.offset == tree.node(node_id).length {
            self.nodes.pop();
            self.node = self.nodes.last().copied();
            self.offset = self.path.pop().map(|i| i + 1).unwrap_or(0);
        }
        let Some(node_id) = self.node else {
            return;
        };
        // Skip children claimed by the other cursor
        while let Some(child) = tree.child_at(node_id, self.offset) {
            if !ignore.contains(&child) {
                break;
            }
            self.offset += 1;
            self.linear_offset += tree.outer_length(child);
        }
        // Enter a non-empty text node at the cursor
        if let Some(child) = tree.child_at(node_id, self.offset) {
            if tree.node(child).is_text() && tree.node(child).length > 0 {
                self.nodes.push(child);
                self.node = Some(child);
                self.path.push(self.offset);
                self.offset = 0;
            }
        }
    }

    /// Descend into the child at the cursor
    ///
    /// Entering an element consumes its open marker (linear +1);
    /// entering a text node consumes nothing. Fatal if there is no child
    /// at the cursor position.
    pub fn step_in(&mut self, tree: &DocumentTree) -> Result<Step, TreeSyncError> {
        let node_id = self
            .node
            .ok_or_else(|| TreeSyncError::CannotStepIn("exhausted".to_string()))?;
        let child = tree.child_at(node_id, self.offset).ok_or_else(|| {
            TreeSyncError::CannotStepIn(tree.node(node_id).type_name().to_string())
        })?;
        let length = if tree.node(child).wrapped { 1 } else { 0 };
        let step = Step {
            kind: StepKind::Open,
            length,
            item: Some(child),
        };
        self.path.push(self.offset);
        self.nodes.push(child);
        self.node = Some(child);
        self.offset = 0;
        self.linear_offset += length;
        self.last_step = Some(step);
        Ok(step)
    }

    /// Ascend to the parent, positioning just past the exited node
    ///
    /// Any unconsumed content of the node is skipped over linearly, plus
    /// the close marker for wrapped elements. Returns None (and leaves
    /// the cursor exhausted) when stepping out of the root.
    pub fn step_out(&mut self, tree: &DocumentTree) -> Option<Step> {
        let node_id = self.node?;
        let node = tree.node(node_id);
        let remaining: usize = if node.is_text() {
            node.length - self.offset
        } else {
            tree.children(node_id)[self.offset..]
                .iter()
                .map(|c| tree.outer_length(*c))
                .sum()
        };
        let marker = if node.wrapped { 1 } else { 0 };
        self.nodes.pop();
        self.node = self.nodes.last().copied();
        if self.node.is_none() {
            // Stepped out of the root; cursor is exhausted
            self.last_step = None;
            return None;
        }
        self.offset = self.path.pop().map(|i| i + 1).unwrap_or(0);
        self.linear_offset += remaining + marker;
        let step = Step {
            kind: StepKind::Close,
            length: marker,
            item: Some(node_id),
        };
        self.last_step = Some(step);
        Some(step)
    }

    /// Advance by up to `max_length` linear units without crossing a
    /// structural boundary
    ///
    /// Returns the step taken: CrossText inside a text node, Cross over
    /// a whole element that fits within `max_length`, Open when
    /// descending into one that does not, or Close when the current node
    /// is exhausted. Returns Ok(None) once the cursor is past the root.
    pub fn step_at_most(
        &mut self,
        tree: &DocumentTree,
        ignore: &[NodeId],
        max_length: usize,
    ) -> Result<Option<Step>, TreeSyncError> {
        if self.node.is_none() {
            self.last_step = None;
            return Ok(None);
        }
        self.normalize(tree, ignore);
        let Some(node_id) = self.node else {
            self.last_step = None;
            return Ok(None);
        };
        if tree.node(node_id).is_text() {
            // Cannot be at the end of the text node: normalize popped out
            let length = max_length.min(tree.node(node_id).length - self.offset);
            let step = Step {
                kind: StepKind::CrossText,
                length,
                item: Some(node_id),
            };
            self.offset += length;
            self.linear_offset += length;
            self.last_step = Some(step);
            return Ok(Some(step));
        }
        let Some(child) = tree.child_at(node_id, self.offset) else {
            return Ok(self.step_out(tree));
        };
        if tree.node(child).is_text() {
            // Only an empty text node can reach here; the walk must
            // never encounter one
            return Err(TreeSyncError::CannotStepIn("text".to_string()));
        }
        let outer = tree.outer_length(child);
        if outer > max_length {
            return Ok(Some(self.step_in(tree)?));
        }
        let step = Step {
            kind: StepKind::Cross,
            length: outer,
            item: Some(child),
        };
        self.offset += 1;
        self.linear_offset += outer;
        self.last_step = Some(step);
        Ok(Some(step))
    }

    /// Re-base this cursor after a splice performed through the other
    /// cursor
    ///
    /// `path`/`offset` locate the splice; `index_delta` is the change in
    /// child count (or character count, for text splices) at that node
    /// and `linear_delta` the change in linear length. Positions
    /// strictly after the splice shift; a position exactly at the splice
    /// point shifts only for insertions (`index_delta > 0`).
    pub fn adjust_path(
        &mut self,
        path: &[usize],
        offset: usize,
        index_delta: isize,
        linear_delta: isize,
    ) {
        let depth = path.len();
        for i in 0..depth {
            match self.path.get(i) {
                None => {
                    // Cursor is shallower; its offset is the index at this depth
                    if self.offset > path[i] {
                        self.linear_offset =
                            (self.linear_offset as isize + linear_delta) as usize;
                    }
                    return;
                }
                Some(&p) if p != path[i] => {
                    if p > path[i] {
                        self.linear_offset =
                            (self.linear_offset as isize + linear_delta) as usize;
                    }
                    return;
                }
                _ => {}
            }
        }
        if self.path.len() == depth {
            // Same node as the splice
            if self.offset > offset || (self.offset == offset && index_delta > 0) {
                self.offset = (self.offset as isize + index_delta) as usize;
                self.linear_offset = (self.linear_offset as isize + linear_delta) as usize;
            }
            return;
        }
        // Cursor is deeper; the affected index is its path entry at the
        // splice node
        if self.path[depth] > offset || (self.path[depth] == offset && index_delta > 0) {
            self.path[depth] = (self.path[depth] as isize + index_delta) as usize;
            self.linear_offset = (self.linear_offset as isize + linear_delta) as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use crate::models::item::{text_items, LinearItem};

    fn two_paragraphs() -> Document {
        // <p>ab</p><p>cd</p>
        let mut items = vec![LinearItem::open("paragraph")];
        items.extend(text_items("ab"));
        items.push(LinearItem::close("paragraph"));
        items.push(LinearItem::open("paragraph"));
        items.extend(text_items("cd"));
        items.push(LinearItem::close("paragraph"));
        Document::from_linear(items).unwrap()
    }

    #[test]
    fn test_walk_whole_document() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        let mut kinds = Vec::new();
        loop {
            match cursor.step_at_most(&doc.tree, &[], 1).unwrap() {
                Some(step) => kinds.push(step.kind),
                None => break,
            }
        }
        assert_eq!(
            kinds,
            vec![
                StepKind::Open,
                StepKind::CrossText,
                StepKind::CrossText,
                StepKind::Close,
                StepKind::Open,
                StepKind::CrossText,
                StepKind::CrossText,
                StepKind::Close,
            ]
        );
        assert_eq!(cursor.linear_offset, doc.linear.len());
    }

    #[test]
    fn test_cross_whole_node() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        let step = cursor.step_at_most(&doc.tree, &[], 4).unwrap().unwrap();
        assert_eq!(step.kind, StepKind::Cross);
        assert_eq!(step.length, 4);
        assert_eq!(cursor.offset, 1);
        assert_eq!(cursor.linear_offset, 4);
    }

    #[test]
    fn test_crosstext_stops_at_node_boundary() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.step_in(&doc.tree).unwrap();
        // Ask for more than the text node holds; only its two
        // characters are consumed
        let step = cursor.step_at_most(&doc.tree, &[], 10).unwrap().unwrap();
        assert_eq!(step.kind, StepKind::CrossText);
        assert_eq!(step.length, 2);
    }

    #[test]
    fn test_normalize_pops_exhausted_text_node() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.step_in(&doc.tree).unwrap();
        cursor.step_at_most(&doc.tree, &[], 2).unwrap();
        // Inside the text node, at its end
        assert_eq!(cursor.path.len(), 2);
        cursor.normalize(&doc.tree, &[]);
        // Popped out: just past the text node inside the paragraph
        assert_eq!(cursor.path.len(), 1);
        assert_eq!(cursor.offset, 1);
        assert_eq!(cursor.linear_offset, 3);
    }

    #[test]
    fn test_normalize_skips_ignored_children() {
        let doc = two_paragraphs();
        let first = doc.tree.child_at(doc.tree.root(), 0).unwrap();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.normalize(&doc.tree, &[first]);
        assert_eq!(cursor.offset, 1);
        assert_eq!(cursor.linear_offset, 4);
    }

    #[test]
    fn test_step_out_skips_unconsumed_content() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.step_in(&doc.tree).unwrap();
        // Leave immediately: skips both characters plus the close marker
        let step = cursor.step_out(&doc.tree).unwrap();
        assert_eq!(step.kind, StepKind::Close);
        assert_eq!(cursor.offset, 1);
        assert_eq!(cursor.linear_offset, 4);
    }

    #[test]
    fn test_step_out_of_root_exhausts_cursor() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        assert!(cursor.step_out(&doc.tree).is_none());
        assert_eq!(cursor.node, None);
        assert!(cursor.step_at_most(&doc.tree, &[], 1).unwrap().is_none());
    }

    #[test]
    fn test_adjust_path_after_sibling_removed() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.path = vec![1];
        cursor.nodes.push(doc.tree.child_at(doc.tree.root(), 1).unwrap());
        cursor.node = doc.tree.child_at(doc.tree.root(), 1);
        cursor.offset = 0;
        cursor.linear_offset = 5;
        // A sibling at root index 0 (outer length 4) was removed
        cursor.adjust_path(&[], 0, -1, -4);
        assert_eq!(cursor.path, vec![0]);
        assert_eq!(cursor.linear_offset, 1);
    }

    #[test]
    fn test_adjust_path_at_insertion_point_shifts() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.offset = 1;
        cursor.linear_offset = 4;
        // Insertion exactly at the cursor shifts it past the new node
        cursor.adjust_path(&[], 1, 1, 3);
        assert_eq!(cursor.offset, 2);
        assert_eq!(cursor.linear_offset, 7);
    }

    #[test]
    fn test_adjust_path_removal_at_cursor_index_ignored() {
        let doc = two_paragraphs();
        let mut cursor = TreeCursor::new(doc.tree.root());
        cursor.offset = 1;
        cursor.linear_offset = 4;
        // Removal after the cursor leaves it untouched
        cursor.adjust_path(&[], 1, -1, -4);
        assert_eq!(cursor.offset, 1);
        assert_eq!(cursor.linear_offset, 4);
    }
}
