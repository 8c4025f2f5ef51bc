//! Property-based tests for filtering, row serialization and checkbox
//! propagation over generated forests.

use proptest::prelude::*;
use proptest::sample::Index;

use horizon_arbor::tree::{
    FilterFields, FilterMode, FilteredForest, InteractionEvent, NodeStore, SelectionMode, TreeConfig, TreeEngine,
    TreeNode,
};

fn arb_label() -> impl Strategy<Value = String> {
    "[abcé]{1,4}"
}

fn arb_node() -> impl Strategy<Value = TreeNode> {
    let leaf = (arb_label(), any::<bool>()).prop_map(|(label, expanded)| TreeNode {
        label: Some(label),
        expanded,
        ..Default::default()
    });
    leaf.prop_recursive(3, 32, 4, |inner| {
        (arb_label(), any::<bool>(), prop::collection::vec(inner, 0..4)).prop_map(|(label, expanded, children)| {
            TreeNode {
                label: Some(label),
                expanded,
                children,
                ..Default::default()
            }
        })
    })
}

fn assign_keys(nodes: &mut [TreeNode], next: &mut usize) {
    for node in nodes {
        node.key = Some(next.to_string());
        *next += 1;
        assign_keys(&mut node.children, next);
    }
}

fn arb_forest() -> impl Strategy<Value = Vec<TreeNode>> {
    prop::collection::vec(arb_node(), 0..4).prop_map(|mut forest| {
        assign_keys(&mut forest, &mut 0);
        forest
    })
}

/// Rows a forest should produce: nodes whose ancestors are all expanded.
fn count_visible(nodes: &[TreeNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + if node.expanded { count_visible(&node.children) } else { 0 })
        .sum()
}

proptest! {
    #[test]
    fn prop_filter_is_pure(forest in arb_forest(), query in "[abcé]{1,2}") {
        let store = NodeStore::from_forest(forest);
        let fields = FilterFields::default();
        for mode in [FilterMode::Lenient, FilterMode::Strict] {
            let first = FilteredForest::build(&store, &query, &fields, mode).export(&store);
            let second = FilteredForest::build(&store, &query, &fields, mode).export(&store);
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn prop_modes_keep_the_same_roots(forest in arb_forest(), query in "[abcé]{1,2}") {
        let store = NodeStore::from_forest(forest);
        let fields = FilterFields::default();
        let lenient = FilteredForest::build(&store, &query, &fields, FilterMode::Lenient);
        let strict = FilteredForest::build(&store, &query, &fields, FilterMode::Strict);
        prop_assert_eq!(lenient.roots(), strict.roots());
    }

    #[test]
    fn prop_filter_reset_restores_rows(forest in arb_forest(), query in "[abcé]{1,2}") {
        let mut engine = TreeEngine::new(TreeConfig::default()).with_value(forest);
        let value = engine.value();
        let rows = engine.rows().to_vec();

        engine.filter(&query);
        engine.filter("");

        prop_assert!(engine.filtered_nodes().is_none());
        prop_assert_eq!(engine.rows(), rows.as_slice());
        prop_assert_eq!(engine.value(), value);
    }

    #[test]
    fn prop_rows_are_a_preorder(forest in arb_forest()) {
        let expected = count_visible(&forest);
        let engine = TreeEngine::new(TreeConfig::default()).with_value(forest);
        let rows = engine.rows();
        prop_assert_eq!(rows.len(), expected);

        for (i, row) in rows.iter().enumerate() {
            prop_assert!(row.visible);
            match row.parent {
                None => prop_assert_eq!(row.level, 0),
                Some(parent) => {
                    let parent_row = rows[..i].iter().rev().find(|r| r.id == parent);
                    prop_assert!(parent_row.is_some());
                    prop_assert_eq!(row.level, parent_row.map_or(0, |r| r.level) + 1);
                }
            }
            if i > 0 {
                prop_assert!(row.level <= rows[i - 1].level + 1);
            }
        }
    }

    #[test]
    fn prop_checkbox_select_covers_subtree(forest in arb_forest(), pick in any::<Index>()) {
        let mut engine = TreeEngine::new(TreeConfig::default().with_selection_mode(SelectionMode::Checkbox))
            .with_value(forest);
        let ids = engine.store().preorder();
        prop_assume!(!ids.is_empty());
        let target = *pick.get(&ids);

        engine.toggle_selection(target, InteractionEvent::click());
        prop_assert!(engine.is_selected(target));
        for descendant in engine.store().descendants(target) {
            prop_assert!(engine.is_selected(descendant));
            prop_assert!(!engine.is_partial_selected(descendant));
        }
        for ancestor in engine.store().ancestors(target) {
            let children = engine.store().children(ancestor);
            let all = children.iter().all(|&child| engine.is_selected(child));
            prop_assert_eq!(engine.is_selected(ancestor), all);
            prop_assert_eq!(engine.is_partial_selected(ancestor), !all);
        }

        engine.toggle_selection(target, InteractionEvent::click());
        prop_assert!(engine.selection().is_empty());
    }
}
