//! Shared builders for integration tests

use editor_model::{Document, LinearItem};

/// Linear items for `<type>...inner...</type>`
pub fn wrap(node_type: &str, inner: Vec<LinearItem>) -> Vec<LinearItem> {
    let mut items = vec![LinearItem::open(node_type)];
    items.extend(inner);
    items.push(LinearItem::close(node_type));
    items
}

/// Linear items for a paragraph of plain text
pub fn paragraph(text: &str) -> Vec<LinearItem> {
    wrap("paragraph", editor_model::models::item::text_items(text))
}

/// Build a document, panicking on malformed input
pub fn doc(items: Vec<LinearItem>) -> Document {
    Document::from_linear(items).unwrap()
}
