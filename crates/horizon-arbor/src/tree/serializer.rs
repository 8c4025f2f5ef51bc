//! Flattening of a hierarchy into display rows.
//!
//! Rows come out in depth-first pre-order. A node's children are emitted only
//! when the node is both visible and expanded, so the row list is exactly what
//! a scrolling renderer needs to lay out.

use horizon_arbor_core::{PerfSpan, span_names};

use super::node::NodeId;
use super::store::Hierarchy;

/// One row of the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowNode {
    /// The node shown on this row.
    pub id: NodeId,
    /// Its parent, `None` for top-level rows.
    pub parent: Option<NodeId>,
    /// Depth, 0 for top-level rows.
    pub level: usize,
    /// Whether every ancestor is expanded.
    pub visible: bool,
}

/// Flattens `view` into rows.
pub fn serialize<H: Hierarchy + ?Sized>(view: &H) -> Vec<RowNode> {
    let _perf = PerfSpan::new(span_names::SERIALIZE);
    let mut rows = Vec::new();
    serialize_level(view, view.root_ids(), None, 0, true, &mut rows);
    tracing::trace!(target: "horizon_arbor::serializer", rows = rows.len(), "rows serialized");
    rows
}

fn serialize_level<H: Hierarchy + ?Sized>(
    view: &H,
    nodes: &[NodeId],
    parent: Option<NodeId>,
    level: usize,
    visible: bool,
    rows: &mut Vec<RowNode>,
) {
    for &id in nodes {
        let visible = visible && parent.is_none_or(|parent| view.is_expanded(parent));
        rows.push(RowNode { id, parent, level, visible });
        if visible && view.is_expanded(id) {
            serialize_level(view, view.child_ids(id), Some(id), level + 1, visible, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeStore, TreeNode};

    fn labels(store: &NodeStore, rows: &[RowNode]) -> Vec<(String, usize)> {
        rows.iter()
            .map(|row| {
                let label = store.get(row.id).and_then(|e| e.label()).unwrap_or_default();
                (label.to_string(), row.level)
            })
            .collect()
    }

    #[test]
    fn test_collapsed_children_are_skipped() {
        let store = NodeStore::from_forest(vec![
            TreeNode::new("1", "A").with_children(vec![TreeNode::new("1-1", "A1")]),
            TreeNode::new("2", "B"),
        ]);
        let rows = serialize(&store);
        assert_eq!(labels(&store, &rows), vec![("A".into(), 0), ("B".into(), 0)]);
        assert!(rows.iter().all(|row| row.visible && row.parent.is_none()));
    }

    #[test]
    fn test_expanded_rows_in_preorder() {
        let store = NodeStore::from_forest(vec![
            TreeNode::new("1", "A")
                .expanded(true)
                .with_children(vec![
                    TreeNode::new("1-1", "A1")
                        .expanded(true)
                        .with_children(vec![TreeNode::new("1-1-1", "A1a")]),
                    TreeNode::new("1-2", "A2")
                        .with_children(vec![TreeNode::new("1-2-1", "hidden")]),
                ]),
            TreeNode::new("2", "B"),
        ]);
        let rows = serialize(&store);
        assert_eq!(
            labels(&store, &rows),
            vec![
                ("A".into(), 0),
                ("A1".into(), 1),
                ("A1a".into(), 2),
                ("A2".into(), 1),
                ("B".into(), 0),
            ]
        );
        let a1a = rows[2];
        assert_eq!(a1a.parent, Some(rows[1].id));
    }

    #[test]
    fn test_empty_forest() {
        assert!(serialize(&NodeStore::new()).is_empty());
    }
}
