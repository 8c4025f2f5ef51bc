//! Tree node types.
//!
//! [`TreeNode`] is the exchange format with the data source: an owned,
//! recursive value that serializes to camelCase JSON and never carries a
//! parent link. Inside the engine every node lives in the
//! [`NodeStore`](super::NodeStore) arena as a [`NodeEntry`], addressed by a
//! [`NodeId`].

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Arena handle for a node in a [`NodeStore`](super::NodeStore).
    ///
    /// Handles are versioned: once a node is removed (for instance when the
    /// whole forest is replaced), its old handle never resolves again, even if
    /// the slot is reused.
    pub struct NodeId;
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A node as supplied by (and returned to) the data source.
///
/// # Example
///
/// ```
/// use horizon_arbor::tree::TreeNode;
///
/// let documents = TreeNode::new("1", "Documents")
///     .with_children(vec![TreeNode::new("1-1", "Work"), TreeNode::new("1-2", "Home")]);
/// assert_eq!(documents.children.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Stable identifier; selection identity falls back to the node handle
    /// when absent or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Opaque payload owned by the data source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Template discriminator used by renderers.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Ordered children; empty means leaf unless `leaf` says otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Whether children are shown.
    #[serde(default, skip_serializing_if = "is_false")]
    pub expanded: bool,
    /// `Some(false)` excludes the node from selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    /// Explicit leaf override. `Some(false)` marks a node as expandable even
    /// without children (lazily loaded branches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<bool>,
    /// Per-node override of the tree-level drag toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    /// Per-node override of the tree-level drop toggle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub droppable: Option<bool>,
    /// Derived tri-state flag. Written on export, ignored on import.
    #[serde(default, skip_deserializing, skip_serializing_if = "is_false")]
    pub partial_selected: bool,
}

impl TreeNode {
    /// Creates a node with a key and a label.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Creates a node without a key; its identity is its handle.
    pub fn unkeyed(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Sets the children.
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Sets the opaque payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the template discriminator.
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Sets the expanded flag.
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    /// Sets the selectable override.
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = Some(selectable);
        self
    }

    /// Sets the leaf override.
    pub fn leaf(mut self, leaf: bool) -> Self {
        self.leaf = Some(leaf);
        self
    }

    /// Sets the draggable override.
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = Some(draggable);
        self
    }

    /// Sets the droppable override.
    pub fn droppable(mut self, droppable: bool) -> Self {
        self.droppable = Some(droppable);
        self
    }
}

/// A node record inside the arena.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    pub(crate) key: Option<String>,
    pub(crate) label: Option<String>,
    pub(crate) data: Option<serde_json::Value>,
    pub(crate) node_type: Option<String>,
    pub(crate) expanded: bool,
    pub(crate) selectable: Option<bool>,
    pub(crate) leaf: Option<bool>,
    pub(crate) draggable: Option<bool>,
    pub(crate) droppable: Option<bool>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeEntry {
    /// Builds an entry from a node payload; children are linked by the store.
    pub(crate) fn from_payload(node: &TreeNode, parent: Option<NodeId>) -> Self {
        Self {
            key: node.key.clone(),
            label: node.label.clone(),
            data: node.data.clone(),
            node_type: node.node_type.clone(),
            expanded: node.expanded,
            selectable: node.selectable,
            leaf: node.leaf,
            draggable: node.draggable,
            droppable: node.droppable,
            parent,
            children: Vec::with_capacity(node.children.len()),
        }
    }

    /// Returns the key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the key when it is present and non-empty.
    pub fn identity_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| !key.is_empty())
    }

    /// Returns the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the opaque payload, if any.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Returns the template discriminator, if any.
    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    /// Returns the stored expanded flag.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Returns `false` only when the node opts out of selection.
    pub fn is_selectable(&self) -> bool {
        self.selectable != Some(false)
    }

    /// Returns the explicit leaf override.
    pub fn leaf_override(&self) -> Option<bool> {
        self.leaf
    }

    /// Whether the node may be dragged, given the tree-level toggle.
    pub fn is_draggable(&self, tree_draggable: bool) -> bool {
        tree_draggable && self.draggable != Some(false)
    }

    /// Whether the node accepts drops, given the tree-level toggle.
    pub fn is_droppable(&self, tree_droppable: bool) -> bool {
        tree_droppable && self.droppable != Some(false)
    }

    /// Returns the parent handle.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the child handles in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Rebuilds the payload of this entry without children.
    pub(crate) fn to_payload(&self) -> TreeNode {
        TreeNode {
            key: self.key.clone(),
            label: self.label.clone(),
            data: self.data.clone(),
            node_type: self.node_type.clone(),
            children: Vec::new(),
            expanded: self.expanded,
            selectable: self.selectable,
            leaf: self.leaf,
            draggable: self.draggable,
            droppable: self.droppable,
            partial_selected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tree_node_json_is_camel_case() {
        let node = TreeNode::new("1", "Documents").leaf(false).with_type("folder");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"key": "1", "label": "Documents", "type": "folder", "leaf": false})
        );
    }

    #[test]
    fn test_partial_selected_is_output_only() {
        let node: TreeNode =
            serde_json::from_value(json!({"key": "1", "partialSelected": true})).unwrap();
        assert!(!node.partial_selected);

        let exported = TreeNode {
            partial_selected: true,
            ..TreeNode::new("1", "Documents")
        };
        let value = serde_json::to_value(&exported).unwrap();
        assert_eq!(value["partialSelected"], json!(true));
    }

    #[test]
    fn test_entry_flags() {
        let entry = NodeEntry::from_payload(&TreeNode::unkeyed("x").selectable(false), None);
        assert!(!entry.is_selectable());
        assert!(entry.is_draggable(true));
        assert!(!entry.is_draggable(false));

        let entry = NodeEntry::from_payload(&TreeNode::new("", "x").droppable(false), None);
        assert_eq!(entry.key(), Some(""));
        assert_eq!(entry.identity_key(), None);
        assert!(!entry.is_droppable(true));
    }
}
