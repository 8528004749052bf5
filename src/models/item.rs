//! Linear model items
//!
//! The linear model is a flat sequence of items: text units (optionally
//! annotated) and open/close structural markers. One item occupies one
//! linear offset; an element's outer span is its open marker, content,
//! and close marker.

use super::annotations::{AnnotationId, AnnotationStore};
use super::element::Element;
use serde::{Deserialize, Serialize};

/// Out-of-band metadata attached to a single linear offset
///
/// Holds items (e.g. alien meta elements) anchored at exactly that
/// position rather than occupying space in the linear sequence.
pub type MetaSlot = Vec<Element>;

/// One unit of the linear model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinearItem {
    /// A text unit; an empty annotation list means plain text
    Text {
        ch: char,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        annotations: Vec<AnnotationId>,
    },
    /// Open structural marker beginning an element
    Open(Element),
    /// Close structural marker, carrying the bare type name
    Close(String),
}

impl LinearItem {
    /// A plain text unit
    pub fn text(ch: char) -> Self {
        LinearItem::Text {
            ch,
            annotations: Vec::new(),
        }
    }

    /// A text unit with annotation references
    pub fn annotated(ch: char, annotations: Vec<AnnotationId>) -> Self {
        LinearItem::Text { ch, annotations }
    }

    /// An open marker for a typed element with no attributes
    pub fn open(node_type: impl Into<String>) -> Self {
        LinearItem::Open(Element::new(node_type))
    }

    /// A close marker
    pub fn close(node_type: impl Into<String>) -> Self {
        LinearItem::Close(node_type.into())
    }

    /// Whether this item is a text unit
    pub fn is_text(&self) -> bool {
        matches!(self, LinearItem::Text { .. })
    }

    /// Whether this item is a structural marker
    pub fn is_marker(&self) -> bool {
        !self.is_text()
    }

    /// Deep-compare two items, resolving annotation references
    ///
    /// Annotation id lists are compared by resolved value through the
    /// store, so items from transactions built against a different store
    /// instance still compare correctly.
    pub fn compare(a: &LinearItem, b: &LinearItem, store: &AnnotationStore) -> bool {
        match (a, b) {
            (
                LinearItem::Text { ch: ca, annotations: aa },
                LinearItem::Text { ch: cb, annotations: ab },
            ) => ca == cb && store.lists_equal(aa, ab),
            (LinearItem::Open(ea), LinearItem::Open(eb)) => ea == eb,
            (LinearItem::Close(ta), LinearItem::Close(tb)) => ta == tb,
            _ => false,
        }
    }
}

/// Deep-compare two item slices, resolving annotation references
pub fn compare_items(a: &[LinearItem], b: &[LinearItem], store: &AnnotationStore) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| LinearItem::compare(x, y, store))
}

/// Convert a string to plain text items
pub fn text_items(s: &str) -> Vec<LinearItem> {
    s.chars().map(LinearItem::text).collect()
}
