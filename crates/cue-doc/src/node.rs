//! Content node types shared by the store and the context assembler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of a content node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create a NodeId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One unit of hierarchical document content (a "block").
///
/// `children` are kept in presentation order as assigned by the store. Nothing in
/// the workspace reorders them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    pub text: String,
    #[serde(default)]
    pub children: Vec<ContentNode>,
    /// Back-reference used only to locate siblings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
}

impl ContentNode {
    /// A node without children.
    pub fn leaf(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            children: Vec::new(),
            parent_id: None,
        }
    }

    /// Append a child, pointing its back-reference at `self`.
    pub fn with_child(mut self, mut child: ContentNode) -> Self {
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
        self
    }
}

/// Create request for [`crate::DocumentStore::create_node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNode {
    pub text: String,
    pub parent: NodeId,
    /// Position among the parent's children. `None` appends.
    pub order: Option<usize>,
}

impl NewNode {
    /// Append `text` as the last child of `parent`.
    pub fn append(parent: NodeId, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent,
            order: None,
        }
    }

    /// Insert `text` as a child of `parent` at `order`.
    pub fn at(parent: NodeId, order: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent,
            order: Some(order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_with_child_sets_parent() {
        let root = ContentNode::leaf("root", "Root").with_child(ContentNode::leaf("a", "A"));
        assert_eq!(root.children[0].parent_id, Some(NodeId::from("root")));
    }

    #[test]
    fn test_node_serde_defaults() {
        let node: ContentNode = serde_json::from_str(r#"{"id":"x","text":"hi"}"#).unwrap();
        assert!(node.children.is_empty());
        assert!(node.parent_id.is_none());
    }
}
