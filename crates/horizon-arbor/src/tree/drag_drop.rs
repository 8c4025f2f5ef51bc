//! Drag-and-drop validation and re-parenting.
//!
//! Three kinds of target are supported: a point between two rows
//! ([`DropTarget::Point`]), a node itself, making the dragged node its last
//! child ([`DropTarget::Node`]), and the tree background, making it the last
//! root ([`DropTarget::Tree`]).
//!
//! A drop is legal when a drag is in progress, the scopes intersect, the
//! target is not the dragged node, and the target is not inside the dragged
//! node's subtree.

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::store::NodeStore;

/// One or more scope names that restrict which drags a tree accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DragScope {
    /// A single scope name.
    One(String),
    /// Several scope names.
    Many(Vec<String>),
}

impl DragScope {
    /// The scope names as a slice.
    pub fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }

    /// Whether the two scopes share a name.
    pub fn intersects(&self, other: &DragScope) -> bool {
        self.names().iter().any(|name| other.names().contains(name))
    }
}

impl From<&str> for DragScope {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<Vec<&str>> for DragScope {
    fn from(names: Vec<&str>) -> Self {
        Self::Many(names.into_iter().map(str::to_string).collect())
    }
}

/// Scope check: a tree without a droppable scope accepts everything; a tree
/// with one accepts only drags whose scope intersects it.
pub fn is_valid_drag_scope(droppable_scope: Option<&DragScope>, drag_scope: Option<&DragScope>) -> bool {
    match droppable_scope {
        None => true,
        Some(drop) => drag_scope.is_some_and(|drag| drop.intersects(drag)),
    }
}

/// Whether `drag` may be dropped onto `drop`.
///
/// A `None` drop node stands for the tree background and passes the
/// structural checks.
pub fn allow_drop(
    store: &NodeStore,
    drag: Option<NodeId>,
    drop: Option<NodeId>,
    drag_scope: Option<&DragScope>,
    droppable_scope: Option<&DragScope>,
) -> bool {
    let Some(drag) = drag else {
        return false;
    };
    if !store.contains(drag) || !is_valid_drag_scope(droppable_scope, drag_scope) {
        return false;
    }
    match drop {
        None => true,
        Some(drop) => store.contains(drop) && drag != drop && !store.is_ancestor(drag, drop),
    }
}

/// Which side of a row a point drop lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// Above the row.
    Before,
    /// Below the row.
    After,
}

/// Where a drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// Between rows, next to `node`.
    Point {
        /// The row the drop indicator belongs to.
        node: NodeId,
        /// Which side of that row.
        position: DropPosition,
    },
    /// Onto a node; the dragged node becomes its last child.
    Node(NodeId),
    /// Onto the tree background; the dragged node becomes the last root.
    Tree,
}

impl DropTarget {
    /// The node the drop is aimed at, if any.
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Self::Point { node, .. } | Self::Node(node) => Some(node),
            Self::Tree => None,
        }
    }
}

/// A drag in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// The dragged node.
    pub node: NodeId,
    /// Its position in its sibling list when the drag began.
    pub index: usize,
    /// Scope the drag was started with.
    pub scope: Option<DragScope>,
}

/// A legal drop waiting for the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDrop {
    pub(crate) session: DragSession,
    pub(crate) target: DropTarget,
}

impl PendingDrop {
    /// The dragged node.
    pub fn drag_node(&self) -> NodeId {
        self.session.node
    }

    /// Where it would land.
    pub fn target(&self) -> DropTarget {
        self.target
    }
}

/// What a drop request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The drop was illegal or no drag was in progress; nothing changed.
    Rejected,
    /// The forest was updated.
    Applied,
    /// The drop is legal but awaits [`TreeEngine::accept_drop`](crate::tree::TreeEngine::accept_drop).
    Pending(PendingDrop),
}

/// Rejects the one point drop that would leave the order unchanged: "before"
/// the sibling right after the dragged node.
pub fn is_valid_drop_point(store: &NodeStore, drag: NodeId, drop: NodeId, position: DropPosition) -> bool {
    if position == DropPosition::After || store.parent(drag) != store.parent(drop) {
        return true;
    }
    match (store.index_in_parent(drag), store.index_in_parent(drop)) {
        (Some(drag_index), Some(drop_index)) => drag_index + 1 != drop_index,
        _ => false,
    }
}

/// Moves `drag` to `target`. Returns the new parent and index, or `None` when
/// either node is gone.
pub(crate) fn apply_drop(store: &mut NodeStore, drag: NodeId, target: DropTarget) -> Option<(Option<NodeId>, usize)> {
    match target {
        DropTarget::Point { node: drop, position } => {
            let drag_parent = store.parent(drag);
            let drop_parent = store.parent(drop);
            let drag_index = store.index_in_parent(drag)?;
            let drop_index = store.index_in_parent(drop)?;

            store.detach(drag)?;
            let base = if drag_parent == drop_parent && drag_index < drop_index {
                drop_index - 1
            } else {
                drop_index
            };
            let index = match position {
                DropPosition::Before => base,
                DropPosition::After => base + 1,
            };
            store.insert_at(drop_parent, index, drag);
            Some((drop_parent, index))
        }
        DropTarget::Node(drop) => {
            if !store.contains(drop) {
                return None;
            }
            store.detach(drag)?;
            let index = store.children(drop).len();
            store.insert_at(Some(drop), index, drag);
            Some((Some(drop), index))
        }
        DropTarget::Tree => {
            store.detach(drag)?;
            let index = store.roots().len();
            store.insert_at(None, index, drag);
            Some((None, index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;

    fn labels(store: &NodeStore, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| store.get(id).and_then(|e| e.label()).unwrap_or_default().to_string())
            .collect()
    }

    fn flat() -> NodeStore {
        NodeStore::from_forest(vec![
            TreeNode::new("a", "A"),
            TreeNode::new("b", "B"),
            TreeNode::new("c", "C")
                .with_children(vec![TreeNode::new("c1", "C1"), TreeNode::new("c2", "C2")]),
        ])
    }

    fn id(store: &NodeStore, key: &str) -> NodeId {
        store.find_by_key(key).unwrap()
    }

    #[test]
    fn test_scope_intersection() {
        let one = DragScope::from("files");
        let many = DragScope::from(vec!["images", "files"]);
        let other = DragScope::from("mail");
        assert!(one.intersects(&many));
        assert!(!one.intersects(&other));

        assert!(is_valid_drag_scope(None, None));
        assert!(is_valid_drag_scope(None, Some(&other)));
        assert!(!is_valid_drag_scope(Some(&one), None));
        assert!(is_valid_drag_scope(Some(&one), Some(&many)));
        assert!(!is_valid_drag_scope(Some(&one), Some(&other)));
    }

    #[test]
    fn test_scope_serde_accepts_string_or_list() {
        let one: DragScope = serde_json::from_str("\"files\"").unwrap();
        let many: DragScope = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(one, DragScope::from("files"));
        assert_eq!(many.names().len(), 2);
    }

    #[test]
    fn test_allow_drop_structure() {
        let store = flat();
        let c = id(&store, "c");
        let c1 = id(&store, "c1");
        let a = id(&store, "a");

        assert!(!allow_drop(&store, None, Some(a), None, None));
        assert!(!allow_drop(&store, Some(c), Some(c), None, None));
        assert!(!allow_drop(&store, Some(c), Some(c1), None, None));
        assert!(allow_drop(&store, Some(c1), Some(c), None, None));
        assert!(allow_drop(&store, Some(a), Some(c1), None, None));
        assert!(allow_drop(&store, Some(a), None, None, None));
    }

    #[test]
    fn test_point_drop_within_same_list() {
        let mut store = flat();
        let a = id(&store, "a");
        let c = id(&store, "c");

        // Before a later sibling accounts for the removal.
        apply_drop(&mut store, a, DropTarget::Point { node: c, position: DropPosition::Before });
        assert_eq!(labels(&store, store.roots()), vec!["B", "A", "C"]);

        let b = id(&store, "b");
        apply_drop(&mut store, c, DropTarget::Point { node: b, position: DropPosition::Before });
        assert_eq!(labels(&store, store.roots()), vec!["C", "B", "A"]);

        let c = id(&store, "c");
        let a = id(&store, "a");
        apply_drop(&mut store, c, DropTarget::Point { node: a, position: DropPosition::After });
        assert_eq!(labels(&store, store.roots()), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_point_drop_across_lists() {
        let mut store = flat();
        let a = id(&store, "a");
        let c = id(&store, "c");
        let c2 = id(&store, "c2");

        let placed = apply_drop(&mut store, a, DropTarget::Point { node: c2, position: DropPosition::Before });
        assert_eq!(placed, Some((Some(c), 1)));
        assert_eq!(labels(&store, store.children(c)), vec!["C1", "A", "C2"]);
        assert_eq!(store.parent(a), Some(c));
    }

    #[test]
    fn test_node_and_tree_drops_append() {
        let mut store = flat();
        let a = id(&store, "a");
        let c = id(&store, "c");
        let c1 = id(&store, "c1");

        apply_drop(&mut store, a, DropTarget::Node(c));
        assert_eq!(labels(&store, store.children(c)), vec!["C1", "C2", "A"]);

        apply_drop(&mut store, c1, DropTarget::Tree);
        assert_eq!(labels(&store, store.roots()), vec!["B", "C", "C1"]);
        assert_eq!(store.parent(c1), None);
    }

    #[test]
    fn test_drop_point_validity() {
        let store = flat();
        let a = id(&store, "a");
        let b = id(&store, "b");
        let c = id(&store, "c");
        let c1 = id(&store, "c1");

        assert!(!is_valid_drop_point(&store, a, b, DropPosition::Before));
        assert!(is_valid_drop_point(&store, a, b, DropPosition::After));
        assert!(is_valid_drop_point(&store, a, c, DropPosition::Before));
        assert!(is_valid_drop_point(&store, c, a, DropPosition::Before));
        assert!(is_valid_drop_point(&store, a, c1, DropPosition::Before));
    }
}
