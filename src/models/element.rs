//! Structural elements of the linear model
//!
//! An element is what an open marker carries: a node type tag plus
//! optional attributes. Attributes are stored as JSON maps and compared
//! by deep equality.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute map for an element (deep-compared, order-insensitive)
pub type AttributeMap = Map<String, Value>;

/// A structural element: the payload of an open marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Node type tag, e.g. "paragraph" or "image"
    #[serde(rename = "type")]
    pub node_type: String,

    /// Optional attributes, e.g. {"level": 2} on a heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,
}

impl Element {
    /// Create an element with no attributes
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: None,
        }
    }

    /// Create an element with attributes
    pub fn with_attributes(node_type: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: Some(attributes),
        }
    }

    /// Clone this element for re-instantiation in a new node
    ///
    /// Attributes are deep-copied; the clone shares nothing with the
    /// original.
    pub fn cloned(&self) -> Self {
        self.clone()
    }
}
