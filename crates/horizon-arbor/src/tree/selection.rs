//! Selection tracking for single, multiple and checkbox modes.
//!
//! [`SelectionTracker`] owns the selected set and the derived
//! partial-selection flags. It never emits anything itself: every mutating
//! operation returns the [`Notification`]s it produced, in the order the
//! engine must publish them. The selection-changed notification always comes
//! first, followed by the per-node select or unselect.
//!
//! # Identity
//!
//! Two references denote the same node when both carry a non-empty key and
//! the keys are equal, or otherwise when their handles are equal. This keeps a
//! selection meaningful across [`NodeStore::replace`] as long as keys are
//! stable.
//!
//! # Checkbox propagation
//!
//! Toggling a node in checkbox mode optionally selects or unselects its whole
//! subtree ("down") and then re-derives every ancestor ("up"): an ancestor is
//! selected when all its children are, and partially selected when some but
//! not all are, or when any child is itself partial.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::events::{InputSource, InteractionEvent, NodeEvent, Notification};
use super::node::NodeId;
use super::store::{Hierarchy, NodeStore};

/// How clicks change the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one node.
    Single,
    /// Any number of nodes.
    Multiple,
    /// Any number of nodes, with tri-state propagation.
    Checkbox,
}

/// A reference to a selected node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedNode {
    /// Handle of the node when it was selected.
    pub id: NodeId,
    /// Key of the node when it was selected.
    pub key: Option<String>,
}

impl SelectedNode {
    /// Captures the current key of `id`.
    pub fn of(store: &NodeStore, id: NodeId) -> Self {
        Self {
            id,
            key: store.get(id).and_then(|entry| entry.key().map(str::to_string)),
        }
    }

    fn identity_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| !key.is_empty())
    }

    /// Whether both references denote the same node.
    pub fn same_node(&self, other: &SelectedNode) -> bool {
        match (self.identity_key(), other.identity_key()) {
            (Some(a), Some(b)) => a == b,
            _ => self.id == other.id,
        }
    }
}

/// The externally visible selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionValue {
    /// Nothing selected in single mode, or selection disabled.
    #[default]
    None,
    /// The selected node in single mode.
    Single(SelectedNode),
    /// The selected nodes in multiple and checkbox modes, in selection order.
    Multiple(Vec<SelectedNode>),
}

impl SelectionValue {
    /// The selected nodes as a slice.
    pub fn nodes(&self) -> &[SelectedNode] {
        match self {
            Self::None => &[],
            Self::Single(node) => std::slice::from_ref(node),
            Self::Multiple(nodes) => nodes,
        }
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Keys of the selected nodes, skipping unkeyed ones.
    pub fn keys(&self) -> Vec<&str> {
        self.nodes().iter().filter_map(|node| node.key.as_deref()).collect()
    }
}

/// Selection state machine.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    mode: Option<SelectionMode>,
    meta_key_selection: bool,
    propagate_up: bool,
    propagate_down: bool,
    node_touched: bool,
    entries: Vec<SelectedNode>,
    partial: HashSet<NodeId>,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SelectionTracker {
    /// Creates an empty tracker.
    pub fn new(mode: Option<SelectionMode>) -> Self {
        Self {
            mode,
            meta_key_selection: false,
            propagate_up: true,
            propagate_down: true,
            node_touched: false,
            entries: Vec::new(),
            partial: HashSet::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The active mode; `None` disables selection.
    pub fn mode(&self) -> Option<SelectionMode> {
        self.mode
    }

    /// Changes the mode. Switching to single mode keeps only the first entry.
    pub fn set_mode(&mut self, mode: Option<SelectionMode>) {
        self.mode = mode;
        match mode {
            Some(SelectionMode::Single) => self.entries.truncate(1),
            None => self.entries.clear(),
            _ => {}
        }
        if mode != Some(SelectionMode::Checkbox) {
            self.partial.clear();
        }
    }

    /// Whether plain clicks replace the selection and modifier clicks extend it.
    pub fn set_meta_key_selection(&mut self, enabled: bool) {
        self.meta_key_selection = enabled;
    }

    /// Checkbox propagation toggles.
    pub fn set_propagation(&mut self, up: bool, down: bool) {
        self.propagate_up = up;
        self.propagate_down = down;
    }

    /// Marks that the next toggle comes from a touch. Touch input has no
    /// modifier keys, so the meta-key rules are bypassed for that toggle.
    pub fn touch(&mut self) {
        self.node_touched = true;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Position of `id` in the selection, by key or by handle.
    pub fn index_of(&self, store: &NodeStore, id: NodeId) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let needle = SelectedNode::of(store, id);
        self.entries.iter().position(|entry| entry.same_node(&needle))
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, store: &NodeStore, id: NodeId) -> bool {
        self.index_of(store, id).is_some()
    }

    /// Whether `id` is partially selected.
    pub fn is_partial(&self, id: NodeId) -> bool {
        self.partial.contains(&id)
    }

    /// The current selection value.
    pub fn value(&self) -> SelectionValue {
        match self.mode {
            None => SelectionValue::None,
            Some(SelectionMode::Single) => match self.entries.first() {
                Some(node) => SelectionValue::Single(node.clone()),
                None => SelectionValue::None,
            },
            Some(_) => SelectionValue::Multiple(self.entries.clone()),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replaces the selection wholesale. Partial flags are re-derived over the
    /// whole of `view` in checkbox mode.
    pub fn set_value<H: Hierarchy + ?Sized>(&mut self, view: &H, value: SelectionValue) {
        self.entries = match value {
            SelectionValue::None => Vec::new(),
            SelectionValue::Single(node) => vec![node],
            SelectionValue::Multiple(nodes) => nodes,
        };
        if self.mode == Some(SelectionMode::Single) {
            self.entries.truncate(1);
        }
        self.recompute_partial(view);
    }

    /// Re-resolves keyed entries against a replaced forest so their handles
    /// stay live, and drops partial flags for nodes that no longer exist.
    pub fn rebind(&mut self, store: &NodeStore) {
        for entry in &mut self.entries {
            if store.contains(entry.id) {
                continue;
            }
            if let Some(id) = entry.identity_key().and_then(|key| store.find_by_key(key)) {
                entry.id = id;
            }
        }
        self.partial.retain(|&id| store.contains(id));
    }

    /// Handles an activation of `id`.
    pub fn toggle<H: Hierarchy + ?Sized>(
        &mut self,
        view: &H,
        id: NodeId,
        origin: InteractionEvent,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let store = view.store();
        let touched = std::mem::take(&mut self.node_touched) || origin.source == InputSource::Touch;

        let Some(mode) = self.mode else {
            tracing::trace!(target: "horizon_arbor::selection", "selection disabled, ignoring toggle");
            return out;
        };
        if !store.get(id).is_some_and(|entry| entry.is_selectable()) {
            tracing::debug!(target: "horizon_arbor::selection", ?id, "node not selectable");
            return out;
        }

        let selected = self.index_of(store, id);
        let node_event = NodeEvent::new(store, id, origin);

        if mode == SelectionMode::Checkbox {
            let select = selected.is_none();
            if select {
                if self.propagate_down {
                    self.propagate_down_from(view, id, true);
                } else {
                    self.entries.push(SelectedNode::of(store, id));
                }
            } else if self.propagate_down {
                self.propagate_down_from(view, id, false);
            } else {
                self.remove_node(store, id);
            }
            if self.propagate_up
                && let Some(parent) = view.parent_of(id)
            {
                self.propagate_up_from(view, parent, select);
            }
            out.push(Notification::SelectionChanged(self.value()));
            out.push(if select {
                Notification::NodeSelect(node_event)
            } else {
                Notification::NodeUnselect(node_event)
            });
            return out;
        }

        let use_meta_rules = !touched && self.meta_key_selection;
        let with_modifier = origin.modifiers.is_selection_modifier();

        let select = match selected {
            Some(index) if !use_meta_rules || with_modifier => {
                self.entries.remove(index);
                false
            }
            _ => {
                let node = SelectedNode::of(store, id);
                // A plain click under meta rules starts a fresh selection.
                match mode {
                    SelectionMode::Multiple if !use_meta_rules || with_modifier => {
                        self.entries.push(node)
                    }
                    _ => self.entries = vec![node],
                }
                true
            }
        };
        if mode == SelectionMode::Single {
            self.entries.truncate(1);
        }

        tracing::debug!(target: "horizon_arbor::selection", ?id, select, "selection toggled");
        out.push(Notification::SelectionChanged(self.value()));
        out.push(if select {
            Notification::NodeSelect(node_event)
        } else {
            Notification::NodeUnselect(node_event)
        });
        out
    }

    /// Selects `id` in response to a context-menu gesture, unless it is
    /// already selected. Always reports the gesture.
    pub fn context_menu_select<H: Hierarchy + ?Sized>(
        &mut self,
        view: &H,
        id: NodeId,
        origin: InteractionEvent,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let store = view.store();
        let Some(entry) = store.get(id) else {
            return out;
        };
        if !entry.is_selectable() {
            return out;
        }

        if self.mode.is_some() && self.index_of(store, id).is_none() {
            self.entries = vec![SelectedNode::of(store, id)];
            self.recompute_partial(view);
            out.push(Notification::SelectionChanged(self.value()));
        }
        out.push(Notification::ContextMenuSelect(NodeEvent::new(store, id, origin)));
        out
    }

    fn remove_node(&mut self, store: &NodeStore, id: NodeId) {
        if let Some(index) = self.index_of(store, id) {
            self.entries.remove(index);
        }
    }

    fn propagate_down_from<H: Hierarchy + ?Sized>(&mut self, view: &H, id: NodeId, select: bool) {
        let store = view.store();
        let selected = self.index_of(store, id);
        match (select, selected) {
            (true, None) => self.entries.push(SelectedNode::of(store, id)),
            (false, Some(index)) => {
                self.entries.remove(index);
            }
            _ => {}
        }
        self.partial.remove(&id);

        for &child in view.child_ids(id) {
            self.propagate_down_from(view, child, select);
        }
    }

    fn propagate_up_from<H: Hierarchy + ?Sized>(&mut self, view: &H, id: NodeId, select: bool) {
        let store = view.store();
        let children = view.child_ids(id);
        if !children.is_empty() {
            let mut selected_count = 0;
            let mut child_partial = false;
            for &child in children {
                if self.is_selected(store, child) {
                    selected_count += 1;
                } else if self.partial.contains(&child) {
                    child_partial = true;
                }
            }

            if select && selected_count == children.len() {
                if self.index_of(store, id).is_none() {
                    self.entries.push(SelectedNode::of(store, id));
                }
                self.partial.remove(&id);
            } else {
                if !select {
                    self.remove_node(store, id);
                }
                let partial = child_partial || (selected_count > 0 && selected_count != children.len());
                self.set_partial(id, partial);
            }
        }

        if let Some(parent) = view.parent_of(id) {
            self.propagate_up_from(view, parent, select);
        }
    }

    fn set_partial(&mut self, id: NodeId, partial: bool) {
        if partial {
            self.partial.insert(id);
        } else {
            self.partial.remove(&id);
        }
    }

    /// Re-derives every partial flag bottom-up over `view`. Membership is left
    /// untouched.
    pub fn recompute_partial<H: Hierarchy + ?Sized>(&mut self, view: &H) {
        self.partial.clear();
        if self.mode != Some(SelectionMode::Checkbox) || !self.propagate_up {
            return;
        }
        for &root in view.root_ids() {
            self.derive_partial(view, root);
        }
    }

    /// Returns whether `id` is selected, recording its partial flag.
    fn derive_partial<H: Hierarchy + ?Sized>(&mut self, view: &H, id: NodeId) -> bool {
        let store = view.store();
        let children = view.child_ids(id);
        let mut selected_count = 0;
        let mut child_partial = false;
        for &child in children {
            if self.derive_partial(view, child) {
                selected_count += 1;
            } else if self.partial.contains(&child) {
                child_partial = true;
            }
        }

        let selected = self.is_selected(store, id);
        if !selected && !children.is_empty() {
            let partial = child_partial || selected_count > 0;
            self.set_partial(id, partial);
        }
        selected
    }
}

static_assertions::assert_impl_all!(SelectionTracker: Send, Sync);
