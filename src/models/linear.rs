//! Linear data store
//!
//! Flat item sequence plus a parallel per-offset metadata array, always
//! kept the same length. All mutation goes through [`LinearData::batch_splice`],
//! which splices both arrays in lockstep; inverse splices can be
//! replayed in reverse to restore the store's content.

use super::item::{LinearItem, MetaSlot};
use super::ModelError;
use serde::{Deserialize, Serialize};

/// Inverse record of one linear splice
///
/// Replaying these in reverse order restores the linear store (items
/// and metadata) to its pre-splice content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoSplice {
    /// Offset the splice was applied at
    pub offset: usize,
    /// Number of items the splice inserted
    pub inserted_length: usize,
    /// Items the splice removed
    pub removed: Vec<LinearItem>,
    /// Metadata slots the splice removed
    pub removed_metadata: Vec<Option<MetaSlot>>,
}

/// The flat sequence representation of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearData {
    items: Vec<LinearItem>,
    metadata: Vec<Option<MetaSlot>>,
}

impl LinearData {
    /// Create a store from items, with empty metadata at every offset
    pub fn new(items: Vec<LinearItem>) -> Self {
        let metadata = vec![None; items.len()];
        Self { items, metadata }
    }

    /// Create a store from items and a matching metadata array
    pub fn with_metadata(
        items: Vec<LinearItem>,
        metadata: Vec<Option<MetaSlot>>,
    ) -> Result<Self, ModelError> {
        if metadata.len() != items.len() {
            return Err(ModelError::MetadataLengthMismatch {
                metadata: metadata.len(),
                data: items.len(),
            });
        }
        Ok(Self { items, metadata })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[LinearItem] {
        &self.items
    }

    pub fn metadata(&self) -> &[Option<MetaSlot>] {
        &self.metadata
    }

    pub fn item(&self, offset: usize) -> Option<&LinearItem> {
        self.items.get(offset)
    }

    pub fn meta_slot(&self, offset: usize) -> Option<&MetaSlot> {
        self.metadata.get(offset).and_then(|slot| slot.as_ref())
    }

    /// Replace one metadata slot in place, returning the old value
    ///
    /// Used when a close marker's metadata arrives after the marker has
    /// already been spliced in with an empty slot.
    pub fn set_meta_slot(&mut self, offset: usize, slot: Option<MetaSlot>) -> Option<MetaSlot> {
        std::mem::replace(&mut self.metadata[offset], slot)
    }

    /// Splice items and metadata in lockstep
    ///
    /// Removes `remove` items at `offset` and inserts `items` with
    /// `meta` (None = empty slots throughout). Returns what was removed.
    pub fn batch_splice(
        &mut self,
        offset: usize,
        remove: usize,
        items: Vec<LinearItem>,
        meta: Option<Vec<Option<MetaSlot>>>,
    ) -> (Vec<LinearItem>, Vec<Option<MetaSlot>>) {
        let insert_meta = meta.unwrap_or_else(|| vec![None; items.len()]);
        debug_assert_eq!(insert_meta.len(), items.len());
        let removed: Vec<LinearItem> = self
            .items
            .splice(offset..offset + remove, items)
            .collect();
        let removed_meta: Vec<Option<MetaSlot>> = self
            .metadata
            .splice(offset..offset + remove, insert_meta)
            .collect();
        (removed, removed_meta)
    }

    /// Replay inverse splices in reverse order, restoring prior content
    pub fn undo_splices(&mut self, splices: &[UndoSplice]) {
        for splice in splices.iter().rev() {
            self.batch_splice(
                splice.offset,
                splice.inserted_length,
                splice.removed.clone(),
                Some(splice.removed_metadata.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::Element;
    use crate::models::item::text_items;

    #[test]
    fn test_metadata_stays_in_lockstep() {
        let mut data = LinearData::new(text_items("abcd"));
        data.batch_splice(1, 2, text_items("xyz"), None);
        assert_eq!(data.len(), 5);
        assert_eq!(data.metadata().len(), 5);
    }

    #[test]
    fn test_batch_splice_returns_removed() {
        let mut data = LinearData::new(text_items("abcd"));
        let (removed, removed_meta) = data.batch_splice(1, 2, vec![], None);
        assert_eq!(removed, text_items("bc"));
        assert_eq!(removed_meta, vec![None, None]);
        assert_eq!(data.items(), text_items("ad").as_slice());
    }

    #[test]
    fn test_undo_splices_restores_content() {
        let meta = vec![
            None,
            Some(vec![Element::new("alienMeta")]),
            None,
            None,
        ];
        let original = LinearData::with_metadata(text_items("abcd"), meta).unwrap();
        let mut data = original.clone();

        let mut undo = Vec::new();
        let (removed, removed_metadata) = data.batch_splice(1, 1, text_items("xy"), None);
        undo.push(UndoSplice {
            offset: 1,
            inserted_length: 2,
            removed,
            removed_metadata,
        });
        let (removed, removed_metadata) = data.batch_splice(0, 2, vec![], None);
        undo.push(UndoSplice {
            offset: 0,
            inserted_length: 0,
            removed,
            removed_metadata,
        });
        assert_ne!(data, original);

        data.undo_splices(&undo);
        assert_eq!(data, original);
    }

    #[test]
    fn test_with_metadata_length_check() {
        let err = LinearData::with_metadata(text_items("ab"), vec![None]).unwrap_err();
        assert_eq!(
            err,
            ModelError::MetadataLengthMismatch { metadata: 1, data: 2 }
        );
    }
}
