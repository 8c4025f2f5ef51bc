//! The tree engine facade.
//!
//! [`TreeEngine`] owns the node forest, the selection, the active filter and
//! any drag in progress, and keeps the flattened row list in sync with them.
//! Interactions are plain method calls; results are published through the
//! public [`Signal`] fields after the engine state is fully updated, so a slot
//! observing a signal always sees consistent state through the getters it
//! has access to.
//!
//! # Example
//!
//! ```
//! use horizon_arbor::tree::{InteractionEvent, SelectionMode, TreeConfig, TreeEngine, TreeNode};
//!
//! let config = TreeConfig::default().with_selection_mode(SelectionMode::Checkbox);
//! let mut engine = TreeEngine::new(config);
//! engine.set_value(vec![
//!     TreeNode::new("1", "Documents")
//!         .with_children(vec![TreeNode::new("1-1", "Work"), TreeNode::new("1-2", "Home")]),
//! ]);
//!
//! engine.selection_changed.connect(|value| println!("{} selected", value.len()));
//!
//! let work = engine.find_by_key("1-1").unwrap();
//! engine.toggle_selection(work, InteractionEvent::click());
//! assert!(engine.is_partial_selected(engine.find_by_key("1").unwrap()));
//! ```

use horizon_arbor_core::{PerfSpan, Signal, TreeDebug, TreeFormatOptions, TreeSource, span_names};

use super::config::TreeConfig;
use super::drag_drop::{self, DragSession, DropOutcome, DropTarget, PendingDrop};
use super::events::{DropEvent, FilterEvent, InteractionEvent, NodeEvent, Notification};
use super::filter::{FilterMode, FilteredForest, FilteredView};
use super::node::{NodeEntry, NodeId, TreeNode};
use super::selection::{SelectionMode, SelectionTracker, SelectionValue};
use super::serializer::{RowNode, serialize};
use super::store::{Hierarchy, NodeStore, export_forest};
use crate::error::Result;

/// The forest as currently displayed: the original, or a filter result.
#[derive(Clone, Copy)]
enum ActiveView<'a> {
    Original(&'a NodeStore),
    Filtered(FilteredView<'a>),
}

fn active_view<'a>(store: &'a NodeStore, filter: Option<&'a FilteredForest>) -> ActiveView<'a> {
    match filter {
        Some(forest) => ActiveView::Filtered(forest.view(store)),
        None => ActiveView::Original(store),
    }
}

impl Hierarchy for ActiveView<'_> {
    fn store(&self) -> &NodeStore {
        match self {
            Self::Original(store) => store,
            Self::Filtered(view) => view.store(),
        }
    }

    fn root_ids(&self) -> &[NodeId] {
        match self {
            Self::Original(store) => store.root_ids(),
            Self::Filtered(view) => view.root_ids(),
        }
    }

    fn child_ids(&self, id: NodeId) -> &[NodeId] {
        match self {
            Self::Original(store) => store.child_ids(id),
            Self::Filtered(view) => view.child_ids(id),
        }
    }

    fn is_expanded(&self, id: NodeId) -> bool {
        match self {
            Self::Original(store) => Hierarchy::is_expanded(*store, id),
            Self::Filtered(view) => view.is_expanded(id),
        }
    }
}

/// Every node reachable in `view`, in pre-order.
fn view_preorder<H: Hierarchy + ?Sized>(view: &H) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = view.root_ids().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        stack.extend(view.child_ids(id).iter().rev().copied());
    }
    out
}

/// Interactive tree state with change notification.
///
/// All operations take `&mut self`; share an engine across threads behind a
/// lock. Slots run synchronously inside the call that triggered them and
/// must not call back into the engine.
pub struct TreeEngine {
    config: TreeConfig,
    store: NodeStore,
    selection: SelectionTracker,
    filter: Option<FilteredForest>,
    rows: Vec<RowNode>,
    drag: Option<DragSession>,

    /// Emitted with the new value whenever the selection changes through an
    /// interaction. Always precedes the matching `node_select` or
    /// `node_unselect`.
    pub selection_changed: Signal<SelectionValue>,
    /// Emitted when an interaction selects a node.
    pub node_select: Signal<NodeEvent>,
    /// Emitted when an interaction unselects a node.
    pub node_unselect: Signal<NodeEvent>,
    /// Emitted when a node is expanded.
    pub node_expand: Signal<NodeEvent>,
    /// Emitted when a node is collapsed.
    pub node_collapse: Signal<NodeEvent>,
    /// Emitted after a drop is applied, or with `accepted == false` when a
    /// drop awaits [`accept_drop`](Self::accept_drop).
    pub node_drop: Signal<DropEvent>,
    /// Emitted after every filter pass, including clearing with an empty query.
    pub filter_applied: Signal<FilterEvent>,
    /// Emitted for context-menu gestures on selectable nodes.
    pub context_menu_select: Signal<NodeEvent>,
    /// Emitted for double clicks.
    pub node_double_click: Signal<NodeEvent>,
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeEngine {
    /// Creates an engine with an empty forest.
    pub fn new(config: TreeConfig) -> Self {
        let mut selection = SelectionTracker::new(config.selection_mode);
        selection.set_meta_key_selection(config.meta_key_selection);
        selection.set_propagation(config.propagate_selection_up, config.propagate_selection_down);

        Self {
            config,
            store: NodeStore::new(),
            selection,
            filter: None,
            rows: Vec::new(),
            drag: None,
            selection_changed: Signal::new(),
            node_select: Signal::new(),
            node_unselect: Signal::new(),
            node_expand: Signal::new(),
            node_collapse: Signal::new(),
            node_drop: Signal::new(),
            filter_applied: Signal::new(),
            context_menu_select: Signal::new(),
            node_double_click: Signal::new(),
        }
    }

    /// Sets the initial forest.
    pub fn with_value(mut self, forest: Vec<TreeNode>) -> Self {
        self.set_value(forest);
        self
    }

    fn view(&self) -> ActiveView<'_> {
        active_view(&self.store, self.filter.as_ref())
    }

    fn refresh_rows(&mut self) {
        self.rows = serialize(&active_view(&self.store, self.filter.as_ref()));
    }

    fn publish(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification {
                Notification::SelectionChanged(value) => self.selection_changed.emit(value),
                Notification::NodeSelect(event) => self.node_select.emit(event),
                Notification::NodeUnselect(event) => self.node_unselect.emit(event),
                Notification::NodeExpand(event) => self.node_expand.emit(event),
                Notification::NodeCollapse(event) => self.node_collapse.emit(event),
                Notification::NodeDrop(event) => self.node_drop.emit(event),
                Notification::FilterApplied(event) => self.filter_applied.emit(event),
                Notification::ContextMenuSelect(event) => self.context_menu_select.emit(event),
                Notification::NodeDoubleClick(event) => self.node_double_click.emit(event),
            }
        }
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the forest.
    ///
    /// Keyed selections survive the replacement. An active filter is re-run
    /// against the new forest and reported through `filter_applied`.
    pub fn set_value(&mut self, forest: Vec<TreeNode>) {
        self.store.replace(forest);
        self.drag = None;
        self.selection.rebind(&self.store);

        let mut out = Vec::new();
        if let Some(query) = self.filter.as_ref().map(|forest| forest.query().to_string()) {
            out.extend(self.run_filter(&query));
        }
        self.selection
            .recompute_partial(&active_view(&self.store, self.filter.as_ref()));
        self.refresh_rows();
        self.publish(out);
    }

    /// Replaces the forest from a JSON array of nodes.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let forest: Vec<TreeNode> = serde_json::from_str(json)?;
        self.set_value(forest);
        Ok(())
    }

    /// The original forest, including current expanded and partial flags.
    pub fn value(&self) -> Vec<TreeNode> {
        export_forest(&self.store, |id| self.selection.is_partial(id))
    }

    /// The original forest as a JSON array.
    pub fn value_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.value())?)
    }

    /// The node arena.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Returns the entry for `id`.
    pub fn node(&self, id: NodeId) -> Option<&NodeEntry> {
        self.store.get(id)
    }

    /// First node in pre-order with the given key.
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.store.find_by_key(key)
    }

    /// The flattened rows of the displayed forest.
    pub fn rows(&self) -> &[RowNode] {
        &self.rows
    }

    /// Whether `id` is a leaf in the displayed forest.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.view().is_leaf(id)
    }

    /// Whether `id` is shown expanded.
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.view().is_expanded(id)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The active configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// Changing the filter fields, mode or locale re-runs an active filter.
    /// Disabling dragging cancels a drag in progress.
    pub fn set_config(&mut self, config: TreeConfig) {
        let refilter = config.filter_by != self.config.filter_by
            || config.filter_mode != self.config.filter_mode
            || config.filter_locale != self.config.filter_locale;
        let reselect = config.selection_mode != self.config.selection_mode
            || config.propagate_selection_up != self.config.propagate_selection_up;

        self.selection.set_mode(config.selection_mode);
        self.selection.set_meta_key_selection(config.meta_key_selection);
        self.selection
            .set_propagation(config.propagate_selection_up, config.propagate_selection_down);
        if !config.draggable_nodes {
            self.drag = None;
        }
        self.config = config;

        let mut out = Vec::new();
        if refilter && let Some(query) = self.filter.as_ref().map(|forest| forest.query().to_string()) {
            out.extend(self.run_filter(&query));
            self.refresh_rows();
        }
        if reselect {
            self.selection
                .recompute_partial(&active_view(&self.store, self.filter.as_ref()));
        }
        self.publish(out);
    }

    /// Changes the selection mode; `None` disables selection.
    pub fn set_selection_mode(&mut self, mode: Option<SelectionMode>) {
        let config = TreeConfig {
            selection_mode: mode,
            ..self.config.clone()
        };
        self.set_config(config);
    }

    /// Changes the filter field list.
    pub fn set_filter_by(&mut self, fields: impl Into<String>) {
        let config = TreeConfig {
            filter_by: fields.into(),
            ..self.config.clone()
        };
        self.set_config(config);
    }

    /// Changes the filter mode.
    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        let config = TreeConfig {
            filter_mode: mode,
            ..self.config.clone()
        };
        self.set_config(config);
    }

    /// Changes the filter locale; `None` selects the root locale.
    pub fn set_filter_locale(&mut self, tag: Option<String>) {
        let config = TreeConfig {
            filter_locale: tag,
            ..self.config.clone()
        };
        self.set_config(config);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Activates `id`: click, tap or keyboard toggle.
    ///
    /// Ignored when selection is disabled, the node is not selectable, or the
    /// node is hidden by the active filter.
    pub fn toggle_selection(&mut self, id: NodeId, origin: InteractionEvent) {
        let _perf = PerfSpan::new(span_names::SELECTION);
        let view = active_view(&self.store, self.filter.as_ref());
        if !view.contains(id) {
            tracing::debug!(target: "horizon_arbor::selection", ?id, "toggle on node outside the view");
            return;
        }
        let out = self.selection.toggle(&view, id, origin);
        self.publish(out);
    }

    /// Records that the next toggle comes from a touch.
    pub fn node_touch_end(&mut self) {
        self.selection.touch();
    }

    /// Handles a context-menu gesture on `id`.
    pub fn context_menu_select(&mut self, id: NodeId, origin: InteractionEvent) {
        let view = active_view(&self.store, self.filter.as_ref());
        if !view.contains(id) {
            return;
        }
        let out = self.selection.context_menu_select(&view, id, origin);
        self.publish(out);
    }

    /// Handles a double click on `id`.
    pub fn double_click(&mut self, id: NodeId, origin: InteractionEvent) {
        if !self.view().contains(id) {
            return;
        }
        let event = NodeEvent::new(&self.store, id, origin);
        self.publish(vec![Notification::NodeDoubleClick(event)]);
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(&self.store, id)
    }

    /// Whether `id` is partially selected (checkbox mode).
    pub fn is_partial_selected(&self, id: NodeId) -> bool {
        self.selection.is_partial(id)
    }

    /// The current selection.
    pub fn selection(&self) -> SelectionValue {
        self.selection.value()
    }

    /// Replaces the selection without emitting notifications.
    pub fn set_selection(&mut self, value: SelectionValue) {
        let view = active_view(&self.store, self.filter.as_ref());
        self.selection.set_value(&view, value);
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Expands `id`.
    pub fn expand(&mut self, id: NodeId, origin: InteractionEvent) {
        self.set_expanded(id, true, origin);
    }

    /// Collapses `id`.
    pub fn collapse(&mut self, id: NodeId, origin: InteractionEvent) {
        self.set_expanded(id, false, origin);
    }

    /// Flips the expanded state of `id`.
    pub fn toggle_expanded(&mut self, id: NodeId, origin: InteractionEvent) {
        let expanded = self.view().is_expanded(id);
        self.set_expanded(id, !expanded, origin);
    }

    fn set_expanded(&mut self, id: NodeId, expanded: bool, origin: InteractionEvent) {
        if !self.view().contains(id) {
            return;
        }
        let changed = match self.filter.as_mut() {
            Some(forest) => forest.set_expanded(&self.store, id, expanded),
            None => self.store.set_expanded(id, expanded),
        };
        if !changed {
            return;
        }
        self.refresh_rows();

        let event = NodeEvent::new(&self.store, id, origin);
        self.publish(vec![if expanded {
            Notification::NodeExpand(event)
        } else {
            Notification::NodeCollapse(event)
        }]);
    }

    /// Expands every displayed node that has children, without emitting
    /// notifications.
    pub fn expand_all(&mut self) {
        self.set_all_expanded(true);
    }

    /// Collapses every displayed node that has children, without emitting
    /// notifications.
    pub fn collapse_all(&mut self) {
        self.set_all_expanded(false);
    }

    fn set_all_expanded(&mut self, expanded: bool) {
        let view = self.view();
        let ids: Vec<NodeId> = view_preorder(&view)
            .into_iter()
            .filter(|&id| !view.child_ids(id).is_empty())
            .collect();
        for id in ids {
            match self.filter.as_mut() {
                Some(forest) => forest.set_expanded(&self.store, id, expanded),
                None => self.store.set_expanded(id, expanded),
            };
        }
        self.refresh_rows();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Filters the displayed forest. An empty query clears the filter.
    pub fn filter(&mut self, query: &str) {
        let out = self.run_filter(query);
        self.refresh_rows();
        self.publish(out);
    }

    fn run_filter(&mut self, query: &str) -> Vec<Notification> {
        if query.is_empty() {
            self.filter = None;
            return vec![Notification::FilterApplied(FilterEvent {
                query: String::new(),
                filtered: None,
            })];
        }

        let forest = self.build_filter(query);
        let filtered = forest.export(&self.store);
        self.filter = Some(forest);
        vec![Notification::FilterApplied(FilterEvent {
            query: query.to_string(),
            filtered: Some(filtered),
        })]
    }

    fn build_filter(&self, query: &str) -> FilteredForest {
        FilteredForest::build_localized(
            &self.store,
            query,
            &self.config.filter_fields(),
            self.config.filter_mode,
            &self.config.filter_locale(),
        )
    }

    /// Drops the active filter without emitting notifications.
    pub fn reset_filter(&mut self) {
        if self.filter.take().is_some() {
            self.refresh_rows();
        }
    }

    /// Whether a filter is active.
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    /// The active query.
    pub fn filter_query(&self) -> Option<&str> {
        self.filter.as_ref().map(FilteredForest::query)
    }

    /// The active filter result.
    pub fn filtered_forest(&self) -> Option<&FilteredForest> {
        self.filter.as_ref()
    }

    /// The active filter result as owned payloads.
    pub fn filtered_nodes(&self) -> Option<Vec<TreeNode>> {
        let forest = self.filter.as_ref()?;
        Some(export_forest(&forest.view(&self.store), |id| self.selection.is_partial(id)))
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Begins dragging `id`. Returns `false` if the node may not be dragged.
    pub fn start_drag(&mut self, id: NodeId) -> bool {
        let draggable = self
            .store
            .get(id)
            .is_some_and(|entry| entry.is_draggable(self.config.draggable_nodes));
        if !draggable || !self.view().contains(id) {
            tracing::debug!(target: "horizon_arbor::drag_drop", ?id, "drag refused");
            return false;
        }
        let Some(index) = self.store.index_in_parent(id) else {
            return false;
        };
        self.drag = Some(DragSession {
            node: id,
            index,
            scope: self.config.draggable_scope.clone(),
        });
        true
    }

    /// Abandons the drag in progress.
    pub fn stop_drag(&mut self) {
        self.drag = None;
    }

    /// The drag in progress.
    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Whether the drag in progress may end at `target`.
    pub fn allow_drop(&self, target: DropTarget) -> bool {
        match &self.drag {
            Some(session) => self.is_legal_drop(session, target),
            None => false,
        }
    }

    fn is_legal_drop(&self, session: &DragSession, target: DropTarget) -> bool {
        if !self.config.droppable_nodes {
            return false;
        }
        if !drag_drop::allow_drop(
            &self.store,
            Some(session.node),
            target.node(),
            session.scope.as_ref(),
            self.config.droppable_scope.as_ref(),
        ) {
            return false;
        }
        match target {
            DropTarget::Point { node, position } => {
                self.view().contains(node)
                    && drag_drop::is_valid_drop_point(&self.store, session.node, node, position)
            }
            DropTarget::Node(node) => {
                self.view().contains(node)
                    && self
                        .store
                        .get(node)
                        .is_some_and(|entry| entry.is_droppable(self.config.droppable_nodes))
            }
            DropTarget::Tree => true,
        }
    }

    /// Ends the drag in progress at `target`.
    ///
    /// With `validate_drop` off, a legal drop is applied and then reported
    /// through `node_drop`. With it on, the forest is left unchanged, the
    /// proposal is reported with `accepted == false`, and the returned
    /// [`PendingDrop`] must be passed to [`accept_drop`](Self::accept_drop).
    pub fn drop(&mut self, target: DropTarget, origin: InteractionEvent) -> DropOutcome {
        let _perf = PerfSpan::new(span_names::DROP);
        let Some(session) = self.drag.take() else {
            tracing::debug!(target: "horizon_arbor::drag_drop", "drop without a drag");
            return DropOutcome::Rejected;
        };
        if !self.is_legal_drop(&session, target) {
            tracing::debug!(target: "horizon_arbor::drag_drop", ?target, "drop rejected");
            return DropOutcome::Rejected;
        }

        let (position, drop_index) = match target {
            DropTarget::Point { node, position } => {
                (Some(position), self.store.index_in_parent(node).unwrap_or_default())
            }
            DropTarget::Node(node) => (None, self.store.index_in_parent(node).unwrap_or_default()),
            DropTarget::Tree => (None, self.store.roots().len()),
        };
        let mut event = DropEvent {
            drag_node: session.node,
            drop_node: target.node(),
            drag_index: session.index,
            drop_index,
            position,
            accepted: false,
            origin,
        };

        if self.config.validate_drop {
            self.publish(vec![Notification::NodeDrop(event)]);
            return DropOutcome::Pending(PendingDrop { session, target });
        }

        if !self.apply_drop(session.node, target) {
            return DropOutcome::Rejected;
        }
        event.accepted = true;
        self.publish(vec![Notification::NodeDrop(event)]);
        DropOutcome::Applied
    }

    /// Applies a drop previously returned as pending. The drop is checked
    /// again against the current forest; returns `false` if it is no longer
    /// legal.
    pub fn accept_drop(&mut self, pending: PendingDrop) -> bool {
        if !self.is_legal_drop(&pending.session, pending.target) {
            tracing::debug!(target: "horizon_arbor::drag_drop", "pending drop no longer legal");
            return false;
        }
        self.apply_drop(pending.session.node, pending.target)
    }

    fn apply_drop(&mut self, drag: NodeId, target: DropTarget) -> bool {
        let Some((parent, index)) = drag_drop::apply_drop(&mut self.store, drag, target) else {
            return false;
        };
        tracing::debug!(target: "horizon_arbor::drag_drop", ?drag, ?parent, index, "node moved");

        if let Some(query) = self.filter.as_ref().map(|forest| forest.query().to_string()) {
            self.filter = Some(self.build_filter(&query));
        }
        self.selection
            .recompute_partial(&active_view(&self.store, self.filter.as_ref()));
        self.refresh_rows();
        true
    }

    // =========================================================================
    // Debugging
    // =========================================================================

    /// Renders the displayed forest for logs and test failures.
    pub fn debug_tree(&self, options: TreeFormatOptions) -> String {
        let source = DebugSource {
            view: self.view(),
            selection: &self.selection,
        };
        TreeDebug::with_options(options).format(&source)
    }
}

struct DebugSource<'a> {
    view: ActiveView<'a>,
    selection: &'a SelectionTracker,
}

impl TreeSource for DebugSource<'_> {
    type Id = NodeId;

    fn root_ids(&self) -> Vec<NodeId> {
        self.view.root_ids().to_vec()
    }

    fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        if self.view.is_expanded(id) {
            self.view.child_ids(id).to_vec()
        } else {
            Vec::new()
        }
    }

    fn node_label(&self, id: NodeId) -> String {
        let entry = self.view.store().get(id);
        entry.and_then(NodeEntry::label).unwrap_or("<unlabeled>").to_string()
    }

    fn node_annotation(&self, id: NodeId) -> Option<String> {
        let store = self.view.store();
        let mut parts = Vec::new();
        if let Some(key) = store.get(id).and_then(NodeEntry::key) {
            parts.push(format!("key={key}"));
        }
        if !self.view.is_leaf(id) && !self.view.is_expanded(id) {
            parts.push("collapsed".to_string());
        }
        if self.selection.is_selected(store, id) {
            parts.push("selected".to_string());
        } else if self.selection.is_partial(id) {
            parts.push("partial".to_string());
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

static_assertions::assert_impl_all!(TreeEngine: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_arbor_core::TreeStyle;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn documents() -> Vec<TreeNode> {
        vec![
            TreeNode::new("1", "Documents").with_children(vec![
                TreeNode::new("1-1", "Work").with_children(vec![
                    TreeNode::new("1-1-0", "Expenses.doc"),
                    TreeNode::new("1-1-1", "Resume.doc"),
                ]),
                TreeNode::new("1-2", "Home"),
            ]),
            TreeNode::new("2", "Pictures"),
        ]
    }

    fn engine(config: TreeConfig) -> TreeEngine {
        TreeEngine::new(config).with_value(documents())
    }

    fn id(engine: &TreeEngine, key: &str) -> NodeId {
        engine.find_by_key(key).unwrap()
    }

    #[test]
    fn test_rows_follow_expansion() {
        let mut engine = engine(TreeConfig::default());
        assert_eq!(engine.rows().len(), 2);

        let docs = id(&engine, "1");
        engine.expand(docs, InteractionEvent::click());
        assert_eq!(engine.rows().len(), 4);

        engine.expand_all();
        assert_eq!(engine.rows().len(), 6);
        engine.collapse_all();
        assert_eq!(engine.rows().len(), 2);
    }

    #[test]
    fn test_expand_emits_once() {
        let mut engine = engine(TreeConfig::default());
        let expanded = Arc::new(Mutex::new(Vec::new()));
        let expanded_clone = expanded.clone();
        engine
            .node_expand
            .connect(move |event: &NodeEvent| expanded_clone.lock().push(event.key.clone()));

        let docs = id(&engine, "1");
        engine.expand(docs, InteractionEvent::click());
        engine.expand(docs, InteractionEvent::click());
        assert_eq!(*expanded.lock(), vec![Some("1".to_string())]);
    }

    #[test]
    fn test_selection_disabled_by_default() {
        let mut engine = engine(TreeConfig::default());
        let fired = Arc::new(Mutex::new(0));
        let fired_clone = fired.clone();
        engine.selection_changed.connect(move |_| *fired_clone.lock() += 1);

        engine.toggle_selection(id(&engine, "1"), InteractionEvent::click());
        assert_eq!(*fired.lock(), 0);
        assert_eq!(engine.selection(), SelectionValue::None);
    }

    #[test]
    fn test_value_exports_partial_flags() {
        let mut engine = engine(TreeConfig::default().with_selection_mode(SelectionMode::Checkbox));
        engine.toggle_selection(id(&engine, "1-2"), InteractionEvent::click());

        let value = engine.value();
        assert!(value[0].partial_selected);
        assert!(!value[0].children[1].partial_selected);
        assert!(!engine.value_json().unwrap().contains("parent"));
    }

    #[test]
    fn test_filter_hides_and_reset_restores() {
        let mut engine = engine(TreeConfig::default());
        engine.filter("resume");
        assert!(engine.is_filtered());
        assert_eq!(engine.filter_query(), Some("resume"));
        assert_eq!(engine.rows().len(), 3);
        assert!(!engine.is_leaf(id(&engine, "1-1")));
        assert!(engine.is_leaf(id(&engine, "1-2")));

        engine.reset_filter();
        assert!(!engine.is_filtered());
        assert_eq!(engine.rows().len(), 2);
    }

    #[test]
    fn test_toggle_outside_filter_is_ignored() {
        let mut engine = engine(TreeConfig::default().with_selection_mode(SelectionMode::Single));
        engine.filter("resume");
        engine.toggle_selection(id(&engine, "2"), InteractionEvent::click());
        assert_eq!(engine.selection(), SelectionValue::None);
    }

    #[test]
    fn test_set_filter_mode_reruns_filter() {
        let mut engine = TreeEngine::new(TreeConfig::default()).with_value(vec![
            TreeNode::new("1", "Work").with_children(vec![TreeNode::new("1-1", "Photo.png")]),
        ]);
        engine.filter("work");
        assert_eq!(engine.filtered_nodes().unwrap()[0].children.len(), 1);

        engine.set_filter_mode(FilterMode::Strict);
        assert_eq!(engine.filtered_nodes().unwrap()[0].children.len(), 0);
    }

    #[test]
    fn test_drag_requires_toggles() {
        let mut engine = engine(TreeConfig::default());
        assert!(!engine.start_drag(id(&engine, "2")));

        let mut engine = engine_with_drag();
        let pictures = id(&engine, "2");
        assert!(engine.start_drag(pictures));
        assert_eq!(engine.drag_session().map(|s| s.node), Some(pictures));
        engine.stop_drag();
        assert!(engine.drag_session().is_none());
    }

    fn engine_with_drag() -> TreeEngine {
        engine(TreeConfig::default().with_drag_drop(true, true))
    }

    #[test]
    fn test_drop_into_node() {
        let mut engine = engine_with_drag();
        let pictures = id(&engine, "2");
        let docs = id(&engine, "1");
        engine.start_drag(pictures);
        assert!(engine.allow_drop(DropTarget::Node(docs)));
        assert_eq!(engine.drop(DropTarget::Node(docs), InteractionEvent::click()), DropOutcome::Applied);
        assert_eq!(engine.store().parent(pictures), Some(docs));
        assert_eq!(engine.store().roots(), &[docs]);
        assert!(engine.drag_session().is_none());
    }

    #[test]
    fn test_drop_into_own_subtree_rejected() {
        let mut engine = engine_with_drag();
        let docs = id(&engine, "1");
        let work = id(&engine, "1-1");
        engine.start_drag(docs);
        assert!(!engine.allow_drop(DropTarget::Node(work)));
        assert_eq!(engine.drop(DropTarget::Node(work), InteractionEvent::click()), DropOutcome::Rejected);
        assert_eq!(engine.store().parent(work), Some(docs));
    }

    #[test]
    fn test_drop_without_drag_rejected() {
        let mut engine = engine_with_drag();
        let docs = id(&engine, "1");
        assert_eq!(engine.drop(DropTarget::Node(docs), InteractionEvent::click()), DropOutcome::Rejected);
    }

    #[test]
    fn test_non_droppable_node() {
        let mut engine = TreeEngine::new(TreeConfig::default().with_drag_drop(true, true)).with_value(vec![
            TreeNode::new("a", "A").droppable(false),
            TreeNode::new("b", "B"),
        ]);
        let a = id(&engine, "a");
        let b = id(&engine, "b");
        engine.start_drag(b);
        assert!(!engine.allow_drop(DropTarget::Node(a)));
        assert!(engine.allow_drop(DropTarget::Tree));
    }

    #[test]
    fn test_debug_tree() {
        let mut engine = engine(TreeConfig::default().with_selection_mode(SelectionMode::Checkbox));
        engine.expand(id(&engine, "1"), InteractionEvent::click());
        engine.toggle_selection(id(&engine, "1-2"), InteractionEvent::click());

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::default()
        };
        let output = engine.debug_tree(options);
        assert!(output.contains("Documents [key=1, partial]"));
        assert!(output.contains("Work [key=1-1, collapsed]"));
        assert!(output.contains("Home [key=1-2, selected]"));
        assert!(!output.contains("Expenses.doc"));
    }

    #[test]
    fn test_load_json() {
        let mut engine = TreeEngine::default();
        engine
            .load_json(r#"[{"key": "1", "label": "One", "children": [{"key": "1-1", "label": "Child"}]}]"#)
            .unwrap();
        assert_eq!(engine.store().len(), 2);
        assert!(engine.load_json("not json").is_err());
        assert_eq!(engine.store().len(), 2);
    }
}
