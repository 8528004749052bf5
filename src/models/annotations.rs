//! Annotation store for text formatting metadata
//!
//! Annotations (bold, link, ...) are stored out-of-line from the text,
//! interned in a store that hands out stable ids. Linear text items
//! reference annotations by id; comparing two annotated values resolves
//! the ids through the store, so two documents agree on a value even
//! when their stores assigned different ids.

use super::element::AttributeMap;
use serde::{Deserialize, Serialize};

/// Stable reference to an interned annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnotationId(pub usize);

/// A single annotation value, e.g. bold or a link with an href
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name, e.g. "textStyle/bold" or "link"
    pub name: String,

    /// Optional attributes, e.g. {"href": "..."} on a link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(name: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            name: name.into(),
            attributes: Some(attributes),
        }
    }
}

/// Interning store for annotations
///
/// Interning the same value twice returns the same id; distinct values
/// get distinct ids. Ids are never reused within one store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStore {
    values: Vec<Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an annotation, returning its id
    pub fn index(&mut self, annotation: Annotation) -> AnnotationId {
        if let Some(pos) = self.values.iter().position(|v| *v == annotation) {
            return AnnotationId(pos);
        }
        self.values.push(annotation);
        AnnotationId(self.values.len() - 1)
    }

    /// Resolve an id back to its annotation
    pub fn value(&self, id: AnnotationId) -> Option<&Annotation> {
        self.values.get(id.0)
    }

    /// Deep-compare two annotation reference lists through this store
    ///
    /// Lists are ordered; they are equal when they resolve to the same
    /// annotation values in the same order. Unresolvable ids never
    /// compare equal to anything.
    pub fn lists_equal(&self, a: &[AnnotationId], b: &[AnnotationId]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b.iter()).all(|(x, y)| {
                match (self.value(*x), self.value(*y)) {
                    (Some(va), Some(vb)) => va == vb,
                    _ => false,
                }
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
