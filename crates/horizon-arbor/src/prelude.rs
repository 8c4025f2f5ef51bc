//! Prelude module for Horizon Arbor.
//!
//! ```ignore
//! use horizon_arbor::prelude::*;
//! ```

// ============================================================================
// Signals
// ============================================================================

pub use horizon_arbor_core::{ConnectionId, Signal};

// ============================================================================
// Engine
// ============================================================================

pub use crate::error::{Result, TreeError};
pub use crate::tree::{TreeConfig, TreeEngine};

// ============================================================================
// Nodes and events
// ============================================================================

pub use crate::tree::{
    DropOutcome, DropPosition, DropTarget, FilterMode, InteractionEvent, KeyboardModifiers, NodeEvent,
    NodeId, RowNode, SelectionMode, SelectionValue, TreeNode,
};
