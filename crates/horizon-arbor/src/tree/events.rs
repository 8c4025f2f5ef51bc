//! Input descriptions and notification payloads.
//!
//! The engine does not read input devices. Callers describe each interaction
//! with an [`InteractionEvent`] and receive [`Notification`]s back through the
//! engine's signals.

use super::drag_drop::DropPosition;
use super::node::{NodeId, TreeNode};
use super::selection::SelectionValue;
use super::store::NodeStore;

/// Modifier keys held during an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key (Ctrl on all platforms).
    pub control: bool,
    /// Alt key (Option on macOS).
    pub alt: bool,
    /// Meta key (Command on macOS, Windows key elsewhere).
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control only.
    pub const CONTROL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Meta only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Whether the "add to selection" modifier is held. Control and Meta are
    /// treated alike so both platforms' conventions work.
    pub fn is_selection_modifier(&self) -> bool {
        self.control || self.meta
    }
}

/// Where an interaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum InputSource {
    /// Pointer click.
    #[default]
    Mouse,
    /// Keyboard activation (Enter/Space on a focused row).
    Keyboard,
    /// Touch tap.
    Touch,
}

/// The triggering interaction, forwarded in every notification it causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct InteractionEvent {
    /// Input device.
    pub source: InputSource,
    /// Modifier keys held.
    pub modifiers: KeyboardModifiers,
}

impl InteractionEvent {
    /// A plain mouse click.
    pub fn click() -> Self {
        Self::default()
    }

    /// A mouse click with modifiers.
    pub fn click_with(modifiers: KeyboardModifiers) -> Self {
        Self {
            source: InputSource::Mouse,
            modifiers,
        }
    }

    /// A keyboard activation.
    pub fn keyboard() -> Self {
        Self {
            source: InputSource::Keyboard,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// A touch tap.
    pub fn touch() -> Self {
        Self {
            source: InputSource::Touch,
            modifiers: KeyboardModifiers::NONE,
        }
    }
}

/// A notification about a single node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEvent {
    /// The affected node.
    pub node: NodeId,
    /// Its key at the time of the event.
    pub key: Option<String>,
    /// The interaction that caused it.
    pub origin: InteractionEvent,
}

impl NodeEvent {
    pub(crate) fn new(store: &NodeStore, node: NodeId, origin: InteractionEvent) -> Self {
        Self {
            node,
            key: store.get(node).and_then(|entry| entry.key().map(str::to_string)),
            origin,
        }
    }
}

/// A completed or proposed drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropEvent {
    /// The dragged node.
    pub drag_node: NodeId,
    /// The node dropped on or next to; `None` for drops onto the tree itself.
    pub drop_node: Option<NodeId>,
    /// Where the dragged node sat in its list before the drop.
    pub drag_index: usize,
    /// Position of `drop_node` in its list, or of the new root for tree drops.
    pub drop_index: usize,
    /// Set for drops between rows.
    pub position: Option<DropPosition>,
    /// `false` while the drop waits for [`TreeEngine::accept_drop`](crate::tree::TreeEngine::accept_drop).
    pub accepted: bool,
    /// The interaction that caused it.
    pub origin: InteractionEvent,
}

/// Published after a filter pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEvent {
    /// The query as typed.
    pub query: String,
    /// The surviving nodes; `None` when the filter was cleared.
    pub filtered: Option<Vec<TreeNode>>,
}

/// A queued notification. Operations collect these while they mutate state
/// and the engine emits them afterwards, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The selection value changed.
    SelectionChanged(SelectionValue),
    /// A node became selected.
    NodeSelect(NodeEvent),
    /// A node became unselected.
    NodeUnselect(NodeEvent),
    /// A node was expanded.
    NodeExpand(NodeEvent),
    /// A node was collapsed.
    NodeCollapse(NodeEvent),
    /// A node was dropped, or a drop awaits acceptance.
    NodeDrop(DropEvent),
    /// A filter pass completed.
    FilterApplied(FilterEvent),
    /// A node was chosen through a context-menu gesture.
    ContextMenuSelect(NodeEvent),
    /// A node was double-clicked.
    NodeDoubleClick(NodeEvent),
}
