//! Node-type registry
//!
//! Maps type tags to node rules, and acts as the factory used when the
//! tree modifier instantiates a node from a bare open-tag element. Each
//! registered type declares whether it is wrapped by open/close markers,
//! whether it holds content (text and inline leaves) and which child
//! types it allows.

use super::ModelError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Rules for one registered node type
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// Whether the node occupies open/close markers in the linear model
    pub is_wrapped: bool,
    /// Whether the node's children are text and inline leaves
    pub can_contain_content: bool,
    /// Whether the node itself is inline content (e.g. image)
    pub is_content: bool,
    /// Allowed child types; None = any
    pub child_node_types: Option<Vec<String>>,
}

impl NodeSpec {
    /// Whether a node of this type can have child nodes at all
    pub fn can_have_children(&self) -> bool {
        !self.is_content
    }

    fn branch(child_node_types: Option<Vec<String>>) -> Self {
        Self {
            is_wrapped: true,
            can_contain_content: false,
            is_content: false,
            child_node_types,
        }
    }

    fn content_branch() -> Self {
        Self {
            is_wrapped: true,
            can_contain_content: true,
            is_content: false,
            child_node_types: None,
        }
    }

    fn content_leaf() -> Self {
        Self {
            is_wrapped: true,
            can_contain_content: false,
            is_content: true,
            child_node_types: Some(Vec::new()),
        }
    }
}

fn types(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|s| s.to_string()).collect())
}

/// Built-in node types shared by every registry
static BUILTIN_TYPES: Lazy<Vec<(&'static str, NodeSpec)>> = Lazy::new(|| {
    vec![
        (
            "document",
            NodeSpec {
                is_wrapped: false,
                can_contain_content: false,
                is_content: false,
                child_node_types: None,
            },
        ),
        ("paragraph", NodeSpec::content_branch()),
        ("heading", NodeSpec::content_branch()),
        ("preformatted", NodeSpec::content_branch()),
        ("blockquote", NodeSpec::branch(None)),
        ("center", NodeSpec::branch(None)),
        ("list", NodeSpec::branch(types(&["listItem"]))),
        ("listItem", NodeSpec::branch(None)),
        ("definitionList", NodeSpec::branch(types(&["definitionListItem"]))),
        ("definitionListItem", NodeSpec::branch(None)),
        ("table", NodeSpec::branch(types(&["tableSection"]))),
        ("tableSection", NodeSpec::branch(types(&["tableRow"]))),
        ("tableRow", NodeSpec::branch(types(&["tableCell"]))),
        ("tableCell", NodeSpec::branch(None)),
        ("image", NodeSpec::content_leaf()),
        ("alienBlock", NodeSpec::content_leaf()),
        ("alienInline", NodeSpec::content_leaf()),
    ]
});

/// Registry of node types
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    specs: HashMap<String, NodeSpec>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        let mut specs = HashMap::new();
        for (name, spec) in BUILTIN_TYPES.iter() {
            specs.insert((*name).to_string(), spec.clone());
        }
        Self { specs }
    }
}

impl NodeRegistry {
    /// A registry containing only the built-in types
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or override) a node type
    pub fn register(&mut self, name: impl Into<String>, spec: NodeSpec) {
        self.specs.insert(name.into(), spec);
    }

    /// Look up a node type's rules
    pub fn spec(&self, name: &str) -> Option<&NodeSpec> {
        self.specs.get(name)
    }

    /// Look up a node type's rules, failing on unknown types
    pub fn require(&self, name: &str) -> Result<&NodeSpec, ModelError> {
        self.specs
            .get(name)
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))
    }
}
