//! Text-level transaction tests: character edits, annotations, metadata
//! and the inverse-splice undo log.

mod common;

use common::{doc, paragraph, wrap};
use editor_model::models::item::text_items;
use editor_model::{
    Annotation, AnnotationStore, Document, LinearData, LinearItem, NodeRegistry, Operation,
    Transaction, TreeSyncError,
};

#[test]
fn test_replace_character() {
    let mut document = doc(paragraph("abc"));
    let para = document.node_at_path(&[0]).unwrap();
    let text = document.node_at_path(&[0, 0]).unwrap();

    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::replace(text_items("b"), text_items("X")),
    ]);
    document.commit(&tx).unwrap();

    assert_eq!(document.linear.items(), paragraph("aXc").as_slice());
    // Same paragraph, same text node; only a character changed
    assert_eq!(document.node_at_path(&[0]), Some(para));
    assert_eq!(document.node_at_path(&[0, 0]), Some(text));
    assert_eq!(document.tree.node(text).length, 3);
    assert_eq!(document.tree.node(para).length, 3);
    assert_eq!(document.tree.node(para).outer_length(), 5);
}

#[test]
fn test_insert_text_into_empty_paragraph() {
    let mut document = doc(wrap("paragraph", vec![]));
    let para = document.node_at_path(&[0]).unwrap();
    assert!(document.tree.children(para).is_empty());

    let tx = Transaction::new(vec![
        Operation::retain(1),
        Operation::replace(vec![], text_items("x")),
    ]);
    document.commit(&tx).unwrap();

    assert_eq!(document.linear.items(), paragraph("x").as_slice());
    // A text node was created to hold the character
    assert_eq!(document.tree.children(para).len(), 1);
    assert_eq!(document.tree.node(para).length, 1);
}

#[test]
fn test_delete_all_text_removes_text_node() {
    let mut document = doc(paragraph("ab"));
    let para = document.node_at_path(&[0]).unwrap();

    let tx = Transaction::new(vec![
        Operation::retain(1),
        Operation::replace(text_items("ab"), vec![]),
    ]);
    document.commit(&tx).unwrap();

    assert_eq!(document.linear.items(), wrap("paragraph", vec![]).as_slice());
    assert_eq!(document.node_at_path(&[0]), Some(para));
    // The emptied text node is dropped, not kept at length zero
    assert!(document.tree.children(para).is_empty());
    assert_eq!(document.tree.node(para).length, 0);
}

#[test]
fn test_undo_splices_restore_linear() {
    let mut document = doc([paragraph("ab"), paragraph("cd")].concat());
    let before = document.linear.clone();

    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::replace(text_items("b"), text_items("xyz")),
        Operation::retain(5),
        Operation::replace(vec![], paragraph("q")),
    ]);
    let undo = document.commit(&tx).unwrap();
    assert_ne!(document.linear, before);

    document.linear.undo_splices(&undo);
    assert_eq!(document.linear, before);
}

#[test]
fn test_remove_annotated_text_compares_by_value() {
    let mut store = AnnotationStore::new();
    let bold = store.index(Annotation::new("textStyle/bold"));
    let mut items = vec![LinearItem::open("paragraph")];
    items.push(LinearItem::annotated('a', vec![bold]));
    items.push(LinearItem::close("paragraph"));
    let linear = LinearData::new(items);
    let mut document = Document::from_parts(linear, store, NodeRegistry::new()).unwrap();

    // The transaction resolves its annotation reference through the
    // store; comparison is by value, not raw id
    let other = document.store.index(Annotation::new("textStyle/bold"));
    let tx = Transaction::new(vec![
        Operation::retain(1),
        Operation::replace(vec![LinearItem::annotated('a', vec![other])], vec![]),
    ]);
    document.commit(&tx).unwrap();
    assert_eq!(document.linear.items(), wrap("paragraph", vec![]).as_slice());
}

#[test]
fn test_removed_data_mismatch_fails() {
    let mut document = doc(paragraph("ab"));
    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::replace(text_items("x"), vec![]),
    ]);
    let err = document.commit(&tx).unwrap_err();
    assert_eq!(err, TreeSyncError::RemovedDataMismatch);
}

#[test]
fn test_removed_annotation_mismatch_fails() {
    let mut store = AnnotationStore::new();
    let bold = store.index(Annotation::new("textStyle/bold"));
    let mut items = vec![LinearItem::open("paragraph")];
    items.push(LinearItem::annotated('a', vec![bold]));
    items.push(LinearItem::close("paragraph"));
    let mut document =
        Document::from_parts(LinearData::new(items), store, NodeRegistry::new()).unwrap();

    // Claiming the character without its annotation must fail
    let tx = Transaction::new(vec![
        Operation::retain(1),
        Operation::replace(text_items("a"), vec![]),
    ]);
    let err = document.commit(&tx).unwrap_err();
    assert_eq!(err, TreeSyncError::RemovedDataMismatch);
}

#[test]
fn test_transaction_longer_than_document_fails() {
    let mut document = doc(paragraph("ab"));
    let tx = Transaction::new(vec![Operation::retain(100)]);
    let err = document.commit(&tx).unwrap_err();
    assert_eq!(err, TreeSyncError::RemoverPastEnd);
}

fn image_with_metadata() -> Document {
    // <p>a<image/>b</p> with a metadata slot on the image's open marker
    let mut items = vec![LinearItem::open("paragraph"), LinearItem::text('a')];
    items.extend(wrap("image", vec![]));
    items.push(LinearItem::text('b'));
    items.push(LinearItem::close("paragraph"));
    let mut metadata = vec![None; items.len()];
    metadata[2] = Some(vec![editor_model::Element::new("alienMeta")]);
    let linear = LinearData::with_metadata(items, metadata).unwrap();
    Document::from_parts(linear, AnnotationStore::new(), NodeRegistry::new()).unwrap()
}

#[test]
fn test_remove_with_metadata_claim() {
    let mut document = image_with_metadata();
    let slot = Some(vec![editor_model::Element::new("alienMeta")]);
    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::Replace {
            remove: wrap("image", vec![]),
            remove_metadata: Some(vec![slot, None]),
            insert: vec![],
            insert_metadata: None,
        },
    ]);
    let undo = document.commit(&tx).unwrap();

    assert_eq!(document.linear.items(), paragraph("ab").as_slice());
    assert!(!document.tree.has_adjacent_text_siblings());

    // The undo log restores the metadata slot along with the items
    let before = image_with_metadata();
    document.linear.undo_splices(&undo);
    assert_eq!(document.linear, before.linear);
}

#[test]
fn test_removed_metadata_mismatch_fails() {
    let mut document = image_with_metadata();
    // Claiming the image without its open-marker metadata must fail
    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::replace(wrap("image", vec![]), vec![]),
    ]);
    let err = document.commit(&tx).unwrap_err();
    assert_eq!(err, TreeSyncError::RemovedMetadataMismatch);
}

#[test]
fn test_insert_with_metadata() {
    let mut document = doc(paragraph("a"));
    let slot = Some(vec![editor_model::Element::new("alienMeta")]);
    let tx = Transaction::new(vec![
        Operation::retain(2),
        Operation::Replace {
            remove: vec![],
            remove_metadata: None,
            insert: wrap("image", vec![]),
            insert_metadata: Some(vec![slot.clone(), None]),
        },
    ]);
    document.commit(&tx).unwrap();

    let mut expected = vec![LinearItem::open("paragraph"), LinearItem::text('a')];
    expected.extend(wrap("image", vec![]));
    expected.push(LinearItem::close("paragraph"));
    assert_eq!(document.linear.items(), expected.as_slice());
    assert_eq!(document.linear.meta_slot(2), slot.as_ref());
}

#[test]
fn test_text_merge_invariant_holds_across_edits() {
    let mut inner = text_items("ab");
    inner.extend(wrap("image", vec![]));
    inner.extend(text_items("cd"));
    inner.extend(wrap("image", vec![]));
    inner.extend(text_items("ef"));
    let mut document = doc(wrap("paragraph", inner));

    // Remove both images in one transaction; all three runs collapse
    let tx = Transaction::new(vec![
        Operation::retain(3),
        Operation::replace(wrap("image", vec![]), vec![]),
        Operation::retain(2),
        Operation::replace(wrap("image", vec![]), vec![]),
    ]);
    document.commit(&tx).unwrap();

    assert_eq!(document.linear.items(), paragraph("abcdef").as_slice());
    assert!(!document.tree.has_adjacent_text_siblings());
    let para = document.node_at_path(&[0]).unwrap();
    assert_eq!(document.tree.children(para).len(), 1);
}
