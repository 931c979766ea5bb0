//! Document store interface and an in-memory implementation.

use crate::error::DocError;
use crate::node::{ContentNode, NewNode, NodeId};
use std::collections::HashMap;

/// Read/write access to an externally owned outline document.
///
/// Reads are strongly consistent lookups. Writes are committed individually; the
/// store performs no multi-step transactions.
pub trait DocumentStore {
    /// Raw text of a node.
    fn node_text(&self, id: &NodeId) -> Option<String>;

    /// Full subtree rooted at `root`.
    fn subtree(&self, root: &NodeId) -> Option<ContentNode>;

    /// Parent of a node. `None` for pages and unknown ids.
    fn parent_id(&self, id: &NodeId) -> Option<NodeId>;

    /// Ordered children of `parent`, each with its own subtree.
    fn children(&self, parent: &NodeId) -> Vec<ContentNode>;

    /// Page root whose title equals `title`.
    fn resolve_title(&self, title: &str) -> Option<NodeId>;

    /// Page root containing `id` (a page is its own page).
    fn page_of(&self, id: &NodeId) -> Option<NodeId>;

    /// Create a node and return its id.
    fn create_node(&mut self, node: NewNode) -> Result<NodeId, DocError>;

    /// Overwrite the text of an existing node.
    fn update_node(&mut self, id: &NodeId, text: &str) -> Result<(), DocError>;
}

// Compile-time check: DocumentStore must be object-safe
const _: () = {
    fn _assert_object_safe(_: &dyn DocumentStore) {}
};

#[derive(Debug, Clone)]
struct Record {
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory outline document: a list of pages, each the root of a node tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    nodes: HashMap<NodeId, Record>,
    pages: Vec<NodeId>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page with the given title and return its id.
    pub fn add_page(&mut self, title: impl Into<String>) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(
            id.clone(),
            Record {
                text: title.into(),
                parent: None,
                children: Vec::new(),
            },
        );
        self.pages.push(id.clone());
        id
    }

    /// Append a child with `text` and return its id.
    pub fn push_child(&mut self, parent: &NodeId, text: impl Into<String>) -> Result<NodeId, DocError> {
        self.create_node(NewNode::append(parent.clone(), text))
    }

    /// Page ids in creation order.
    pub fn pages(&self) -> &[NodeId] {
        &self.pages
    }

    /// Ids of the direct children of `parent`.
    pub fn child_ids(&self, parent: &NodeId) -> Vec<NodeId> {
        self.nodes
            .get(parent)
            .map(|r| r.children.clone())
            .unwrap_or_default()
    }

    /// Position of `id` among its siblings.
    pub fn order_of(&self, id: &NodeId) -> Option<usize> {
        let parent = self.nodes.get(id)?.parent.as_ref()?;
        self.nodes
            .get(parent)?
            .children
            .iter()
            .position(|c| c == id)
    }

    /// Whether the node exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, pages included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn build(&self, id: &NodeId) -> Option<ContentNode> {
        let record = self.nodes.get(id)?;
        Some(ContentNode {
            id: id.clone(),
            text: record.text.clone(),
            children: record
                .children
                .iter()
                .filter_map(|c| self.build(c))
                .collect(),
            parent_id: record.parent.clone(),
        })
    }
}

impl DocumentStore for MemoryDocument {
    fn node_text(&self, id: &NodeId) -> Option<String> {
        self.nodes.get(id).map(|r| r.text.clone())
    }

    fn subtree(&self, root: &NodeId) -> Option<ContentNode> {
        self.build(root)
    }

    fn parent_id(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|r| r.parent.clone())
    }

    fn children(&self, parent: &NodeId) -> Vec<ContentNode> {
        self.child_ids(parent)
            .iter()
            .filter_map(|c| self.build(c))
            .collect()
    }

    fn resolve_title(&self, title: &str) -> Option<NodeId> {
        self.pages
            .iter()
            .find(|p| self.nodes.get(*p).is_some_and(|r| r.text == title))
            .cloned()
    }

    fn page_of(&self, id: &NodeId) -> Option<NodeId> {
        let mut current = id.clone();
        loop {
            match self.nodes.get(&current)?.parent.clone() {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    fn create_node(&mut self, node: NewNode) -> Result<NodeId, DocError> {
        let id = NodeId::new();
        let parent = self
            .nodes
            .get_mut(&node.parent)
            .ok_or_else(|| DocError::NotFound(node.parent.to_string()))?;

        match node.order {
            Some(order) => {
                let order = order.min(parent.children.len());
                parent.children.insert(order, id.clone());
            }
            None => parent.children.push(id.clone()),
        }

        self.nodes.insert(
            id.clone(),
            Record {
                text: node.text,
                parent: Some(node.parent),
                children: Vec::new(),
            },
        );
        tracing::trace!(node = %id, "created node");
        Ok(id)
    }

    fn update_node(&mut self, id: &NodeId, text: &str) -> Result<(), DocError> {
        let record = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DocError::NotFound(id.to_string()))?;
        record.text = text.to_string();
        Ok(())
    }
}
