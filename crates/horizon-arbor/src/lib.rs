//! Horizon Arbor - a headless hierarchical tree engine.
//!
//! The engine holds a forest of nodes and implements everything a tree
//! widget needs apart from drawing: expand and collapse, single, multiple and
//! checkbox selection with tri-state propagation, accent-insensitive
//! filtering, flattening into display rows, and drag-and-drop re-parenting.
//! Changes are published through [`Signal`](horizon_arbor_core::Signal)s so
//! any rendering surface can follow along.
//!
//! # Example
//!
//! ```
//! use horizon_arbor::prelude::*;
//!
//! let mut engine = TreeEngine::new(TreeConfig::default()).with_value(vec![
//!     TreeNode::new("1", "Documents")
//!         .with_children(vec![TreeNode::new("1-1", "Work"), TreeNode::new("1-2", "Home")]),
//!     TreeNode::new("2", "Pictures"),
//! ]);
//!
//! engine.filter("work");
//! assert_eq!(engine.rows().len(), 2);
//! ```

pub use horizon_arbor_core::*;

pub mod error;
pub mod prelude;
pub mod tree;

pub use error::{Result, TreeError};
