//! Tree engine: node storage, selection, filtering, row serialization and
//! drag-and-drop.
//!
//! # Layout
//!
//! - [`node`]: the [`TreeNode`] exchange format and arena handles
//! - [`store`]: the [`NodeStore`] arena and the [`Hierarchy`] trait
//! - [`filter`]: accent-insensitive filtering into a [`FilteredForest`]
//! - [`serializer`]: flattening into display rows
//! - [`selection`]: single, multiple and checkbox selection
//! - [`drag_drop`]: drop validation and re-parenting
//! - [`engine`]: the [`TreeEngine`] facade that ties them together

pub mod config;
pub mod drag_drop;
pub mod engine;
pub mod events;
pub mod filter;
pub mod node;
pub mod selection;
pub mod serializer;
pub mod store;

pub use config::TreeConfig;
pub use drag_drop::{DragScope, DragSession, DropOutcome, DropPosition, DropTarget, PendingDrop};
pub use engine::TreeEngine;
pub use events::{
    DropEvent, FilterEvent, InputSource, InteractionEvent, KeyboardModifiers, NodeEvent, Notification,
};
pub use filter::{FilterFields, FilterLocale, FilterMode, FilteredForest, FilteredView};
pub use node::{NodeEntry, NodeId, TreeNode};
pub use selection::{SelectedNode, SelectionMode, SelectionTracker, SelectionValue};
pub use serializer::{RowNode, serialize};
pub use store::{Hierarchy, NodeStore, export_forest};
