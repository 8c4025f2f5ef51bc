//! Arena storage for the node forest.
//!
//! [`NodeStore`] owns every node of the original forest. Parent links are
//! plain handles, so walking towards the root never needs shared ownership
//! and exported data never contains back references.
//!
//! The [`Hierarchy`] trait abstracts over "which children does a node have
//! right now". The store answers with the original children; a
//! [`FilteredView`](super::FilteredView) answers with the pruned ones.
//! Serialization, propagation and leaf checks are written once against the
//! trait.

use slotmap::SlotMap;

use super::node::{NodeEntry, NodeId, TreeNode};
use crate::error::Result;

/// A read-only forest shape.
pub trait Hierarchy {
    /// The arena that owns the nodes.
    fn store(&self) -> &NodeStore;

    /// Top-level nodes in order.
    fn root_ids(&self) -> &[NodeId];

    /// Children of `id` in order. Unknown handles have no children.
    fn child_ids(&self, id: NodeId) -> &[NodeId];

    /// Whether `id` currently shows its children.
    fn is_expanded(&self, id: NodeId) -> bool;

    /// Parent of `id`. Views never re-parent nodes.
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.store().parent(id)
    }

    /// Whether `id` is reachable from the roots of this view.
    fn contains(&self, id: NodeId) -> bool {
        if !self.store().contains(id) {
            return false;
        }
        let mut current = id;
        loop {
            match self.parent_of(current) {
                Some(parent) => {
                    if !self.child_ids(parent).contains(&current) {
                        return false;
                    }
                    current = parent;
                }
                None => return self.root_ids().contains(&current),
            }
        }
    }

    /// Leaf test: an explicit `leaf: false` always wins, otherwise a node is a
    /// leaf when it has no children in this view.
    fn is_leaf(&self, id: NodeId) -> bool {
        match self.store().get(id) {
            Some(entry) if entry.leaf_override() == Some(false) => false,
            Some(_) => self.child_ids(id).is_empty(),
            None => true,
        }
    }
}

/// Owner of all nodes in the original forest.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: SlotMap<NodeId, NodeEntry>,
    roots: Vec<NodeId>,
}

impl NodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a forest of node payloads.
    pub fn from_forest(forest: Vec<TreeNode>) -> Self {
        let mut store = Self::new();
        store.replace(forest);
        store
    }

    /// Parses a JSON array of nodes.
    pub fn from_json(json: &str) -> Result<Self> {
        let forest: Vec<TreeNode> = serde_json::from_str(json)?;
        Ok(Self::from_forest(forest))
    }

    /// Replaces the whole forest. Every previously issued handle becomes stale.
    pub fn replace(&mut self, forest: Vec<TreeNode>) {
        self.nodes.clear();
        self.roots.clear();
        for node in &forest {
            let id = self.insert_subtree(node, None);
            self.roots.push(id);
        }
        tracing::debug!(
            target: "horizon_arbor::store",
            roots = self.roots.len(),
            nodes = self.nodes.len(),
            "forest replaced"
        );
    }

    fn insert_subtree(&mut self, node: &TreeNode, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.insert(NodeEntry::from_payload(node, parent));
        for child in &node.children {
            let child_id = self.insert_subtree(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is a live handle.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the entry for `id`.
    pub fn get(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(id)
    }

    /// Top-level nodes in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|entry| entry.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of `id`; `None` for roots and unknown handles.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|entry| entry.parent)
    }

    /// Iterates from the parent of `id` up to its root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|current| current == ancestor)
    }

    /// The list `id` lives in: its parent's children, or the roots.
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    /// Position of `id` within its sibling list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.siblings(id).iter().position(|&sibling| sibling == id)
    }

    /// All nodes in depth-first pre-order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First node in pre-order whose key equals `key`.
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .find(|&id| self.nodes[id].key() == Some(key))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Writes the stored expanded flag. Returns `true` if it changed.
    pub(crate) fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(entry) if entry.expanded != expanded => {
                entry.expanded = expanded;
                true
            }
            _ => false,
        }
    }

    /// Unlinks `id` from its sibling list and returns where it was.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<(Option<NodeId>, usize)> {
        let parent = self.nodes.get(id)?.parent;
        let list = match parent {
            Some(parent) => &mut self.nodes.get_mut(parent)?.children,
            None => &mut self.roots,
        };
        let index = list.iter().position(|&sibling| sibling == id)?;
        list.remove(index);
        self.nodes[id].parent = None;
        Some((parent, index))
    }

    /// Links a detached node into `parent` (or the roots) at `index`, clamped
    /// to the list length.
    pub(crate) fn insert_at(&mut self, parent: Option<NodeId>, index: usize, id: NodeId) {
        let list = match parent {
            Some(parent) => match self.nodes.get_mut(parent) {
                Some(entry) => &mut entry.children,
                None => return,
            },
            None => &mut self.roots,
        };
        let index = index.min(list.len());
        list.insert(index, id);
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.parent = parent;
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Rebuilds the original forest as owned payloads.
    pub fn to_forest(&self) -> Vec<TreeNode> {
        export_forest(self, |_| false)
    }

    /// Serializes the original forest as a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_forest())?)
    }
}

impl Hierarchy for NodeStore {
    fn store(&self) -> &NodeStore {
        self
    }

    fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.children(id)
    }

    fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(NodeEntry::is_expanded)
    }
}

/// Rebuilds a view as owned payloads, using the view's children and expanded
/// flags and asking `is_partial` for the tri-state flag.
pub fn export_forest<H, F>(view: &H, is_partial: F) -> Vec<TreeNode>
where
    H: Hierarchy + ?Sized,
    F: Fn(NodeId) -> bool,
{
    fn export_node<H, F>(view: &H, id: NodeId, is_partial: &F) -> Option<TreeNode>
    where
        H: Hierarchy + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        let entry = view.store().get(id)?;
        let mut node = entry.to_payload();
        node.expanded = view.is_expanded(id);
        node.partial_selected = is_partial(id);
        node.children = view
            .child_ids(id)
            .iter()
            .filter_map(|&child| export_node(view, child, is_partial))
            .collect();
        Some(node)
    }

    view.root_ids()
        .iter()
        .filter_map(|&id| export_node(view, id, &is_partial))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<TreeNode> {
        vec![
            TreeNode::new("1", "Documents").with_children(vec![
                TreeNode::new("1-1", "Work")
                    .with_children(vec![TreeNode::new("1-1-1", "Expenses.doc")]),
                TreeNode::new("1-2", "Home"),
            ]),
            TreeNode::new("2", "Pictures"),
        ]
    }

    #[test]
    fn test_from_forest_links_parents() {
        let store = NodeStore::from_forest(documents());
        assert_eq!(store.len(), 5);
        assert_eq!(store.roots().len(), 2);

        let work = store.find_by_key("1-1").unwrap();
        let docs = store.find_by_key("1").unwrap();
        assert_eq!(store.parent(work), Some(docs));
        assert_eq!(store.parent(docs), None);
        assert_eq!(store.index_in_parent(work), Some(0));
    }

    #[test]
    fn test_preorder_and_find_first_match() {
        let forest = vec![
            TreeNode::new("a", "first").with_children(vec![TreeNode::new("dup", "inner")]),
            TreeNode::new("dup", "outer"),
        ];
        let store = NodeStore::from_forest(forest);
        let labels: Vec<_> = store
            .preorder()
            .into_iter()
            .map(|id| store.get(id).unwrap().label().unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["first", "inner", "outer"]);

        let found = store.find_by_key("dup").unwrap();
        assert_eq!(store.get(found).unwrap().label(), Some("inner"));
        assert_eq!(store.find_by_key("missing"), None);
    }

    #[test]
    fn test_ancestors() {
        let store = NodeStore::from_forest(documents());
        let expenses = store.find_by_key("1-1-1").unwrap();
        let work = store.find_by_key("1-1").unwrap();
        let docs = store.find_by_key("1").unwrap();
        let pictures = store.find_by_key("2").unwrap();

        assert_eq!(store.ancestors(expenses).collect::<Vec<_>>(), vec![work, docs]);
        assert!(store.is_ancestor(docs, expenses));
        assert!(!store.is_ancestor(expenses, docs));
        assert!(!store.is_ancestor(pictures, expenses));
        assert!(!store.is_ancestor(docs, docs));
    }

    #[test]
    fn test_is_leaf_override() {
        let forest = vec![
            TreeNode::new("lazy", "Lazy").leaf(false),
            TreeNode::new("plain", "Plain"),
            TreeNode::new("forced", "Forced")
                .leaf(true)
                .with_children(vec![TreeNode::new("c", "Child")]),
        ];
        let store = NodeStore::from_forest(forest);
        assert!(!store.is_leaf(store.find_by_key("lazy").unwrap()));
        assert!(store.is_leaf(store.find_by_key("plain").unwrap()));
        // `leaf: true` does not hide real children.
        assert!(!store.is_leaf(store.find_by_key("forced").unwrap()));
    }

    #[test]
    fn test_detach_and_insert() {
        let mut store = NodeStore::from_forest(documents());
        let home = store.find_by_key("1-2").unwrap();
        let docs = store.find_by_key("1").unwrap();

        assert_eq!(store.detach(home), Some((Some(docs), 1)));
        assert_eq!(store.children(docs).len(), 1);
        assert_eq!(store.parent(home), None);

        store.insert_at(None, 0, home);
        assert_eq!(store.roots()[0], home);
        assert_eq!(store.parent(home), None);

        store.detach(home);
        store.insert_at(Some(docs), 99, home);
        assert_eq!(store.children(docs).last(), Some(&home));
        assert_eq!(store.parent(home), Some(docs));
    }

    #[test]
    fn test_replace_invalidates_handles() {
        let mut store = NodeStore::from_forest(documents());
        let docs = store.find_by_key("1").unwrap();
        store.replace(vec![TreeNode::new("x", "X")]);
        assert!(!store.contains(docs));
        assert!(store.children(docs).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_export_round_trip() {
        let forest = documents();
        let store = NodeStore::from_forest(forest.clone());
        assert_eq!(store.to_forest(), forest);

        let json = store.to_json().unwrap();
        assert!(!json.contains("parent"));
        let reparsed = NodeStore::from_json(&json).unwrap();
        assert_eq!(reparsed.to_forest(), forest);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(NodeStore::from_json("{not json").is_err());
        assert!(NodeStore::from_json("[]").unwrap().is_empty());
    }
}
