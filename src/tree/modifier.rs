//! Tree modifier: applies a transaction's operations to the tree
//!
//! The modifier walks the pre-transaction tree with a remover cursor and
//! the post-transaction tree with an inserter cursor, applying each
//! operation while keeping the tree and the linear data consistent at
//! every step. Linear splices always land before the matching tree
//! mutation, so observers notified by tree changes see a store that
//! already reflects the new shape. Nodes whose open tag is removed are
//! only flagged as pending deletions; the deletion is confirmed when the
//! matching close tag arrives, or cancelled when a retain clones the
//! node to keep its content.
//!
//! Instances are not recyclable: `process` runs exactly once.

use crate::models::document::Document;
use crate::models::item::{compare_items, LinearItem, MetaSlot};
use crate::models::linear::UndoSplice;
use crate::transaction::{Operation, Transaction};
use crate::tree::cursor::{Step, StepKind, TreeCursor};
use crate::tree::{NodeId, TreeSyncError};

/// One-shot applier of a transaction against a live document
pub struct TreeModifier<'a> {
    doc: &'a mut Document,
    operations: &'a [Operation],
    /// Nodes provisionally being removed, awaiting their close tag
    deletions: Vec<NodeId>,
    /// Nodes created by the inserter; the remover routes around them
    insertions: Vec<NodeId>,
    remover: TreeCursor,
    inserter: TreeCursor,
    undo_splices: Vec<UndoSplice>,
}

impl<'a> TreeModifier<'a> {
    pub fn new(doc: &'a mut Document, transaction: &'a Transaction) -> Self {
        let root = doc.tree.root();
        Self {
            doc,
            operations: &transaction.operations,
            deletions: Vec::new(),
            insertions: Vec::new(),
            remover: TreeCursor::new(root),
            inserter: TreeCursor::new(root),
            undo_splices: Vec::new(),
        }
    }

    /// Apply every operation, then the implicit retain to document end
    ///
    /// A non-empty pending-deletion set afterwards means a flagged
    /// subtree was never confirmed removed: fatal.
    pub fn process(&mut self) -> Result<(), TreeSyncError> {
        let operations = self.operations;
        for operation in operations {
            self.process_operation(operation)?;
        }
        self.process_implicit_final_retain()?;
        if !self.deletions.is_empty() {
            return Err(TreeSyncError::UnprocessedDeletions);
        }
        Ok(())
    }

    /// The inverse-splice log accumulated by this pass
    ///
    /// Replaying it in reverse restores the linear store (not the tree)
    /// to its pre-transaction content.
    pub fn into_undo_splices(self) -> Vec<UndoSplice> {
        self.undo_splices
    }

    fn process_operation(&mut self, operation: &Operation) -> Result<(), TreeSyncError> {
        match operation {
            Operation::Retain { length } => {
                let mut remaining = *length;
                while remaining > 0 {
                    remaining -= self.process_retain(remaining)?;
                }
                Ok(())
            }
            Operation::Replace {
                remove,
                remove_metadata,
                insert,
                insert_metadata,
            } => {
                if let Some(meta) = remove_metadata {
                    if meta.len() != remove.len() {
                        return Err(TreeSyncError::MetadataLengthMismatch);
                    }
                }
                if let Some(meta) = insert_metadata {
                    if meta.len() != insert.len() {
                        return Err(TreeSyncError::MetadataLengthMismatch);
                    }
                }
                self.each_chunk(remove, remove_metadata, Self::process_remove)?;
                self.each_chunk(insert, insert_metadata, Self::process_insert)?;
                Ok(())
            }
        }
    }

    /// Hand markers one at a time and maximal text runs whole to `handle`
    ///
    /// Grouping contiguous text avoids one cursor step per character.
    fn each_chunk(
        &mut self,
        items: &[LinearItem],
        metadata: &Option<Vec<Option<MetaSlot>>>,
        handle: fn(&mut Self, &[LinearItem], Option<&[Option<MetaSlot>]>) -> Result<(), TreeSyncError>,
    ) -> Result<(), TreeSyncError> {
        let mut i = 0;
        while i < items.len() {
            let start = i;
            if items[i].is_marker() {
                i += 1;
            } else {
                while i < items.len() && items[i].is_text() {
                    i += 1;
                }
            }
            let meta = metadata.as_ref().map(|m| &m[start..i]);
            handle(self, &items[start..i], meta)?;
        }
        Ok(())
    }

    /// Retain to the end of the document
    ///
    /// Transactions are not required to retain to EOF; pretend there is
    /// a final retain covering whatever the remover has not reached.
    fn process_implicit_final_retain(&mut self) -> Result<(), TreeSyncError> {
        loop {
            self.inserter.normalize(&self.doc.tree, &self.deletions);
            self.remover.normalize(&self.doc.tree, &self.insertions);
            let Some(node_id) = self.remover.node else {
                return Ok(());
            };
            if node_id == self.remover.root
                && self.remover.offset == self.doc.tree.children(node_id).len()
            {
                return Ok(());
            }
            let node = self.doc.tree.node(node_id);
            let retain_length = if node.is_text() {
                // Normalize popped out of exhausted text, so this is >= 1
                node.length - self.remover.offset
            } else if !node.can_have_children() {
                1
            } else {
                match self.doc.tree.child_at(node_id, self.remover.offset) {
                    Some(child) => self.doc.tree.outer_length(child),
                    None => 1,
                }
            };
            self.process_retain(retain_length.max(1))?;
        }
    }

    /// Splice the linear data, recording the inverse on the undo stack
    fn splice_linear(
        &mut self,
        offset: usize,
        remove: usize,
        items: Vec<LinearItem>,
        meta: Option<Vec<Option<MetaSlot>>>,
    ) -> (Vec<LinearItem>, Vec<Option<MetaSlot>>) {
        let inserted_length = items.len();
        let (removed, removed_metadata) = self.doc.linear.batch_splice(offset, remove, items, meta);
        self.undo_splices.push(UndoSplice {
            offset,
            inserted_length,
            removed: removed.clone(),
            removed_metadata: removed_metadata.clone(),
        });
        (removed, removed_metadata)
    }

    /// Whether both cursors are in the same node
    fn paths_match(&self) -> bool {
        self.remover.node.is_some() && self.remover.node == self.inserter.node
    }

    /// Whether both cursors point to the same location
    fn cursors_match(&self) -> bool {
        self.paths_match() && self.remover.offset == self.inserter.offset
    }

    /// Process the retention of content passed by one remover step
    ///
    /// Returns the amount of content retained.
    fn process_retain(&mut self, max_length: usize) -> Result<usize, TreeSyncError> {
        self.remover.normalize(&self.doc.tree, &self.insertions);
        self.inserter.normalize(&self.doc.tree, &self.deletions);
        if self.cursors_match() {
            // Advance the cursors together. This is the only way both
            // cursors ever enter the same node: a node entered at an
            // open tag by one cursor alone is flagged as a pending
            // deletion or insertion, so the other routes around it.
            let remover_step = self
                .remover
                .step_at_most(&self.doc.tree, &self.insertions, max_length)?
                .ok_or(TreeSyncError::RemoverPastEnd)?;
            let inserter_step = self
                .inserter
                .step_at_most(&self.doc.tree, &self.deletions, max_length)?
                .ok_or(TreeSyncError::InserterPastEnd)?;
            if remover_step.length != inserter_step.length {
                return Err(TreeSyncError::CursorsDiverged);
            }
            if remover_step.kind == StepKind::Close {
                self.remove_last_if_in_deletions()?;
            }
            return Ok(remover_step.length);
        }
        // The cursors are apart (and so cannot share a node): the
        // remover walks old structure the inserter must reconcile
        let remover_step = self
            .remover
            .step_at_most(&self.doc.tree, &self.insertions, max_length)?
            .ok_or(TreeSyncError::RemoverPastEnd)?;
        match remover_step.kind {
            StepKind::CrossText => self.move_last_cross_text()?,
            StepKind::Cross => self.move_last()?,
            StepKind::Open => {
                self.clone_last_open()?;
                self.inserter.step_in(&self.doc.tree)?;
                if let Some(item) = remover_step.item {
                    self.deletions.push(item);
                }
            }
            StepKind::Close => {
                if self.inserter_in_text_node() {
                    self.inserter.step_out(&self.doc.tree);
                }
                let inserter_step = self
                    .inserter
                    .step_out(&self.doc.tree)
                    .ok_or(TreeSyncError::InserterPastEnd)?;
                let expected = self.step_type_name(&remover_step);
                let actual = self.step_type_name(&inserter_step);
                if expected != actual {
                    return Err(TreeSyncError::CloseTypeMismatch { expected, actual });
                }
                if let Some(item) = remover_step.item {
                    if let Some(pos) = self.deletions.iter().position(|d| *d == item) {
                        self.remove_last()?;
                        self.deletions.remove(pos);
                    }
                }
            }
        }
        Ok(remover_step.length)
    }

    /// Process the removal of one marker or one run of text items
    ///
    /// The remover steps across exactly the expected span, and what was
    /// actually present must deep-match what the operation claims to
    /// remove: a mismatch means the transaction was built against stale
    /// data, which is fatal.
    fn process_remove(
        &mut self,
        claimed: &[LinearItem],
        claimed_meta: Option<&[Option<MetaSlot>]>,
    ) -> Result<(), TreeSyncError> {
        let step = self
            .remover
            .step_at_most(&self.doc.tree, &self.insertions, claimed.len().max(1))?
            .ok_or(TreeSyncError::RemoverPastEnd)?;
        let (actual, actual_meta): (Vec<LinearItem>, Vec<Option<MetaSlot>>) = match step.kind {
            StepKind::CrossText => self.remove_last_cross_text()?,
            StepKind::Cross => {
                let (_, data, meta) = self.remove_last()?;
                (data, meta)
            }
            StepKind::Open => {
                let item = step.item.ok_or(TreeSyncError::UnexpectedStep {
                    expected: "open",
                    actual: "none",
                })?;
                self.deletions.push(item);
                let element = self
                    .doc
                    .tree
                    .node(item)
                    .element
                    .clone()
                    .ok_or(TreeSyncError::UnexpectedStep {
                        expected: "open",
                        actual: "crosstext",
                    })?;
                let slot = self.doc.linear.meta_slot(self.remover.linear_offset - 1).cloned();
                (vec![LinearItem::Open(element)], vec![slot])
            }
            StepKind::Close => {
                let type_name = self.step_type_name(&step);
                let slot = self.doc.linear.meta_slot(self.remover.linear_offset - 1).cloned();
                (vec![LinearItem::Close(type_name)], vec![slot])
            }
        };
        if !compare_items(claimed, &actual, &self.doc.store) {
            return Err(TreeSyncError::RemovedDataMismatch);
        }
        if !meta_matches(&actual_meta, claimed_meta) {
            return Err(TreeSyncError::RemovedMetadataMismatch);
        }
        self.remove_last_if_in_deletions()
    }

    /// Process the insertion of one marker or one run of text items
    fn process_insert(
        &mut self,
        items: &[LinearItem],
        meta: Option<&[Option<MetaSlot>]>,
    ) -> Result<(), TreeSyncError> {
        match items {
            [LinearItem::Open(element)] => {
                if self.inserter_in_text_node() {
                    // Step past the end of the text node, even if that
                    // skips content: the remover must later cross that
                    // content in a remove or retain
                    self.inserter.step_out(&self.doc.tree);
                }
                let slot = meta.and_then(|m| m[0].clone());
                let data = vec![
                    LinearItem::Open(element.clone()),
                    LinearItem::Close(element.node_type.clone()),
                ];
                let node = self
                    .doc
                    .tree
                    .create_from_element(element.clone(), &self.doc.registry)?;
                self.insert_node(node, data, Some(vec![slot, None]))?;
                self.inserter.step_in(&self.doc.tree)?;
                Ok(())
            }
            [LinearItem::Close(node_type)] => {
                if self.inserter_in_text_node() {
                    self.inserter.step_out(&self.doc.tree);
                }
                let step = self
                    .inserter
                    .step_out(&self.doc.tree)
                    .ok_or(TreeSyncError::InserterPastEnd)?;
                let expected = self.step_type_name(&step);
                if expected != *node_type {
                    return Err(TreeSyncError::CloseTypeMismatch {
                        expected,
                        actual: node_type.clone(),
                    });
                }
                // Fill in the close marker's metadata slot, left empty
                // when the open tag was inserted
                let slot = meta.and_then(|m| m[0].clone());
                self.doc
                    .linear
                    .set_meta_slot(self.inserter.linear_offset - 1, slot);
                Ok(())
            }
            _ => {
                let data = items.to_vec();
                let meta = meta.map(|m| m.to_vec());
                self.insert_text(data, meta)
            }
        }
    }

    /// Ensure the inserter is inside a text node, without changing its
    /// linear offset; may create a new text node
    ///
    /// Returns the text node the inserter ends up in.
    fn ensure_text_node(&mut self) -> Result<NodeId, TreeSyncError> {
        let node_id = self.inserter.node.ok_or(TreeSyncError::InserterPastEnd)?;
        if self.doc.tree.node(node_id).is_text() {
            return Ok(node_id);
        }
        if !self.doc.tree.node(node_id).can_have_children() {
            return Err(TreeSyncError::CannotAddChild(
                self.doc.tree.node(node_id).type_name().to_string(),
            ));
        }
        let next = self.doc.tree.child_at(node_id, self.inserter.offset);
        let prev = if self.inserter.offset > 0 {
            self.doc.tree.child_at(node_id, self.inserter.offset - 1)
        } else {
            None
        };
        if let Some(next) = next.filter(|c| self.doc.tree.node(*c).is_text()) {
            // The next node is a text node; step in
            if self.cursors_match() {
                self.remover.step_in(&self.doc.tree)?;
            }
            self.inserter.step_in(&self.doc.tree)?;
            Ok(next)
        } else if let Some(prev) = prev.filter(|c| self.doc.tree.node(*c).is_text()) {
            // The previous node is a text node; move backwards, step in
            // and jump to the end
            let length = self.doc.tree.node(prev).length;
            if self.cursors_match() {
                self.remover.offset -= 1;
                self.remover.step_in(&self.doc.tree)?;
                self.remover.offset = length;
            }
            self.inserter.offset -= 1;
            self.inserter.step_in(&self.doc.tree)?;
            self.inserter.offset = length;
            Ok(prev)
        } else {
            // No adjacent text node; insert one and step in
            let text = self.doc.tree.new_text_node(0);
            self.insert_node(text, Vec::new(), None)?;
            if self.cursors_match() {
                self.remover.step_in(&self.doc.tree)?;
            }
            self.inserter.step_in(&self.doc.tree)?;
            Ok(text)
        }
    }

    /// Ensure the inserter is not inside a text node, without changing
    /// its linear offset; may split the text node
    fn ensure_not_text_node(&mut self) -> Result<(), TreeSyncError> {
        let Some(node_id) = self.inserter.node else {
            return Err(TreeSyncError::InserterPastEnd);
        };
        if !self.doc.tree.node(node_id).is_text() {
            return Ok(());
        }
        let offset = self.inserter.offset;
        let text_length = self.doc.tree.node(node_id).length;
        self.inserter.step_out(&self.doc.tree);
        if offset == 0 {
            // Position the cursor before the text node
            self.inserter.offset -= 1;
        } else if offset < text_length {
            // Split the node: truncate it and attach the tail as a new
            // sibling. The characters do not move, so linear offsets are
            // unaffected.
            let tail = text_length - offset;
            if self.remover.node == Some(node_id) && self.remover.offset > offset {
                return Err(TreeSyncError::RemoverInSplitText);
            }
            self.doc.tree.adjust_length(node_id, -(tail as isize));
            let tail_node = self.doc.tree.new_text_node(tail);
            let parent = self.inserter.node.ok_or(TreeSyncError::InserterPastEnd)?;
            self.doc
                .tree
                .splice_children(parent, self.inserter.offset, 0, vec![tail_node]);
            self.insertions.push(tail_node);
            let path = self.inserter.path.clone();
            self.remover.adjust_path(&path, self.inserter.offset, 1, 0);
        }
        Ok(())
    }

    /// Remove the node at the remover, without moving the cursor
    ///
    /// Splices its linear span out first, then detaches it. If the
    /// removal leaves two text nodes abutting, they are merged on the
    /// spot: the tree never holds two adjacent sibling text nodes.
    fn remove_node(&mut self) -> Result<(NodeId, Vec<LinearItem>, Vec<Option<MetaSlot>>), TreeSyncError> {
        let parent = self.remover.node.ok_or(TreeSyncError::RemoverPastEnd)?;
        let node = self
            .doc
            .tree
            .child_at(parent, self.remover.offset)
            .ok_or(TreeSyncError::RemoverPastEnd)?;
        let outer = self.doc.tree.outer_length(node);
        // Adjust linear data before the tree, to ensure consistency when
        // node events are emitted
        let (data, meta) = self.splice_linear(self.remover.linear_offset, outer, Vec::new(), None);
        self.doc
            .tree
            .splice_children(parent, self.remover.offset, 1, Vec::new());
        let remover_path = self.remover.path.clone();
        self.inserter
            .adjust_path(&remover_path, self.remover.offset, -1, -(outer as isize));

        // If the removal made two text nodes adjacent, merge them
        let pre = if self.remover.offset > 0 {
            self.doc.tree.child_at(parent, self.remover.offset - 1)
        } else {
            None
        };
        let post = self.doc.tree.child_at(parent, self.remover.offset);
        if let (Some(pre), Some(post)) = (pre, post) {
            if self.doc.tree.node(pre).is_text() && self.doc.tree.node(post).is_text() {
                let pre_length = self.doc.tree.node(pre).length;
                let post_length = self.doc.tree.node(post).length;
                if self.inserter.node == Some(post) {
                    // The inserter sat inside the absorbed node;
                    // re-target it into the survivor
                    self.inserter.node = Some(pre);
                    if let Some(last) = self.inserter.nodes.last_mut() {
                        *last = pre;
                    }
                    if let Some(last) = self.inserter.path.last_mut() {
                        *last = self.remover.offset - 1;
                    }
                    self.inserter.offset += pre_length;
                    self.doc.tree.adjust_length(pre, post_length as isize);
                    self.doc
                        .tree
                        .splice_children(parent, self.remover.offset, 1, Vec::new());
                } else {
                    self.doc.tree.adjust_length(pre, post_length as isize);
                    self.doc
                        .tree
                        .splice_children(parent, self.remover.offset, 1, Vec::new());
                    let remover_path = self.remover.path.clone();
                    self.inserter
                        .adjust_path(&remover_path, self.remover.offset, -1, 0);
                }
                // Leave the remover inside the merged node at the join
                self.remover.nodes.push(pre);
                self.remover.node = Some(pre);
                self.remover.path.push(self.remover.offset - 1);
                self.remover.offset = pre_length;
            }
        }
        Ok((node, data, meta))
    }

    /// Insert a node at the inserter, without moving the cursor
    fn insert_node(
        &mut self,
        node: NodeId,
        data: Vec<LinearItem>,
        meta: Option<Vec<Option<MetaSlot>>>,
    ) -> Result<(), TreeSyncError> {
        self.ensure_not_text_node()?;
        let parent = self.inserter.node.ok_or(TreeSyncError::InserterPastEnd)?;
        if !self.doc.tree.node(parent).can_have_children() {
            return Err(TreeSyncError::CannotAddChild(
                self.doc.tree.node(parent).type_name().to_string(),
            ));
        }
        // Adjust linear data before the tree, to ensure consistency when
        // node events are emitted
        let length = data.len();
        self.splice_linear(self.inserter.linear_offset, 0, data, meta);
        self.doc
            .tree
            .splice_children(parent, self.inserter.offset, 0, vec![node]);
        self.insertions.push(node);
        let path = self.inserter.path.clone();
        self.remover
            .adjust_path(&path, self.inserter.offset, 1, length as isize);
        Ok(())
    }

    /// Clone the node just opened by the remover and insert the shell at
    /// the inserter
    fn clone_last_open(&mut self) -> Result<(), TreeSyncError> {
        let step = self.expect_last_step(&[StepKind::Open], "open")?;
        let item = step.item.ok_or(TreeSyncError::UnexpectedStep {
            expected: "open",
            actual: "none",
        })?;
        let element = self
            .doc
            .tree
            .node(item)
            .element
            .clone()
            .ok_or(TreeSyncError::UnexpectedStep {
                expected: "open",
                actual: "crosstext",
            })?;
        let node = self
            .doc
            .tree
            .create_from_element(element.clone(), &self.doc.registry)?;
        if self.inserter_in_text_node() {
            self.inserter.step_out(&self.doc.tree);
        }
        let close = LinearItem::Close(element.node_type.clone());
        self.insert_node(node, vec![LinearItem::Open(element), close], None)
    }

    /// Remove the node just crossed or closed by the remover
    fn remove_last(&mut self) -> Result<(NodeId, Vec<LinearItem>, Vec<Option<MetaSlot>>), TreeSyncError> {
        let step = self.expect_last_step(&[StepKind::Cross, StepKind::Close], "cross/close")?;
        let item = step.item.ok_or(TreeSyncError::UnexpectedStep {
            expected: "cross/close",
            actual: "none",
        })?;
        self.remover.offset -= 1;
        self.remover.linear_offset -= self.doc.tree.outer_length(item);
        self.remove_node()
    }

    /// Remove the node just crossed or closed by the remover, if it is
    /// pending deletion
    fn remove_last_if_in_deletions(&mut self) -> Result<(), TreeSyncError> {
        let Some(step) = self.remover.last_step else {
            return Ok(());
        };
        if step.kind != StepKind::Cross && step.kind != StepKind::Close {
            return Ok(());
        }
        let Some(item) = step.item else {
            return Ok(());
        };
        if let Some(pos) = self.deletions.iter().position(|d| *d == item) {
            self.remove_last()?;
            self.deletions.remove(pos);
        }
        Ok(())
    }

    /// Remove the text just crossed by the remover
    fn remove_last_cross_text(
        &mut self,
    ) -> Result<(Vec<LinearItem>, Vec<Option<MetaSlot>>), TreeSyncError> {
        let step = self.expect_last_step(&[StepKind::CrossText], "crosstext")?;
        let length = step.length;
        let node = self.remover.node.ok_or(TreeSyncError::RemoverPastEnd)?;
        self.remover.offset -= length;
        self.remover.linear_offset -= length;
        let start = self.remover.offset;

        self.inserter.normalize(&self.doc.tree, &self.deletions);
        let paths_match = self.paths_match();
        if paths_match {
            if self.inserter.offset >= start + length {
                self.inserter.offset -= length;
                self.inserter.linear_offset -= length;
            } else if self.inserter.offset > start {
                return Err(TreeSyncError::InserterInRemovedRange);
            }
        }
        // Adjust linear data before the tree, to ensure consistency when
        // node events are emitted
        let (data, meta) = self.splice_linear(self.remover.linear_offset, length, Vec::new(), None);
        self.doc.tree.adjust_length(node, -(length as isize));
        if !paths_match {
            let remover_path = self.remover.path.clone();
            self.inserter
                .adjust_path(&remover_path, self.remover.offset, 0, -(length as isize));
        }
        if self.doc.tree.node(node).length == 0 {
            // Remove the emptied text node
            if paths_match {
                self.inserter.step_out(&self.doc.tree);
                self.inserter.offset -= 1;
            }
            self.remover.step_out(&self.doc.tree);
            self.remover.offset -= 1;
            self.remove_node()?;
        }
        Ok((data, meta))
    }

    /// Move the text crossed by the remover's last step to the inserter
    fn move_last_cross_text(&mut self) -> Result<(), TreeSyncError> {
        if self.paths_match() && self.remover.offset < self.inserter.offset {
            return Err(TreeSyncError::AmbiguousTextMove);
        }
        let (data, meta) = self.remove_last_cross_text()?;
        self.insert_text(data, Some(meta))
    }

    /// Move the node crossed by the remover's last step to the inserter
    fn move_last(&mut self) -> Result<(), TreeSyncError> {
        let (node, data, meta) = self.remove_last()?;
        let length = data.len();
        self.insert_node(node, data, Some(meta))?;
        self.inserter.offset += 1;
        self.inserter.linear_offset += length;
        Ok(())
    }

    /// Insert text at the inserter, growing the surrounding text node
    fn insert_text(
        &mut self,
        data: Vec<LinearItem>,
        meta: Option<Vec<Option<MetaSlot>>>,
    ) -> Result<(), TreeSyncError> {
        let text = self.ensure_text_node()?;
        if self.paths_match() && self.inserter.offset > self.remover.offset {
            return Err(TreeSyncError::InsertAheadOfRemover);
        }
        // Adjust linear data before the tree, to ensure consistency when
        // node events are emitted
        let length = data.len();
        self.splice_linear(self.inserter.linear_offset, 0, data, meta);
        self.doc.tree.adjust_length(text, length as isize);
        let path = self.inserter.path.clone();
        self.remover
            .adjust_path(&path, self.inserter.offset, length as isize, length as isize);
        self.inserter.offset += length;
        self.inserter.linear_offset += length;
        Ok(())
    }

    fn inserter_in_text_node(&self) -> bool {
        self.inserter
            .node
            .map_or(false, |n| self.doc.tree.node(n).is_text())
    }

    /// Type name of the node a step touched, for close verification
    fn step_type_name(&self, step: &Step) -> String {
        step.item
            .map(|item| self.doc.tree.node(item).type_name().to_string())
            .unwrap_or_default()
    }

    fn expect_last_step(
        &self,
        kinds: &[StepKind],
        expected: &'static str,
    ) -> Result<Step, TreeSyncError> {
        match self.remover.last_step {
            Some(step) if kinds.contains(&step.kind) => Ok(step),
            Some(step) => Err(TreeSyncError::UnexpectedStep {
                expected,
                actual: step.kind.name(),
            }),
            None => Err(TreeSyncError::UnexpectedStep {
                expected,
                actual: "none",
            }),
        }
    }
}

/// Compare removed metadata against what the operation claimed
///
/// A missing claimed array stands for all-empty slots.
fn meta_matches(actual: &[Option<MetaSlot>], claimed: Option<&[Option<MetaSlot>]>) -> bool {
    match claimed {
        None => actual.iter().all(|slot| slot.is_none()),
        Some(claimed) => claimed == actual,
    }
}
