//! Logging and debugging facilities for Horizon Arbor.
//!
//! This module provides:
//! - Target and span names for the `tracing` crate
//! - Debug visualization for node forests
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Arbor uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_arbor::selection=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! Anything implementing [`TreeSource`] can be rendered with [`TreeDebug`]:
//!
//! ```
//! use horizon_arbor_core::logging::{TreeDebug, TreeFormatOptions, TreeSource, TreeStyle};
//!
//! struct Flat(Vec<&'static str>);
//!
//! impl TreeSource for Flat {
//!     type Id = usize;
//!     fn root_ids(&self) -> Vec<usize> { (0..self.0.len()).collect() }
//!     fn child_ids(&self, _id: usize) -> Vec<usize> { Vec::new() }
//!     fn node_label(&self, id: usize) -> String { self.0[id].to_string() }
//! }
//!
//! let options = TreeFormatOptions { style: TreeStyle::Ascii, ..Default::default() };
//! let text = TreeDebug::with_options(options).format(&Flat(vec!["a", "b"]));
//! assert!(text.contains("a"));
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout Horizon Arbor for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Selection toggle span.
    pub const SELECTION: &str = "horizon_arbor::selection";
    /// Filter pass span.
    pub const FILTER: &str = "horizon_arbor::filter";
    /// Row serialization span.
    pub const SERIALIZE: &str = "horizon_arbor::serialize";
    /// Drop handling span.
    pub const DROP: &str = "horizon_arbor::drop";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "horizon_arbor_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_arbor_core::signal";
    /// Performance spans.
    pub const PERF: &str = "horizon_arbor::perf";
    /// Engine facade target.
    pub const ENGINE: &str = "horizon_arbor::engine";
    /// Node store target.
    pub const STORE: &str = "horizon_arbor::store";
    /// Selection tracker target.
    pub const SELECTION: &str = "horizon_arbor::selection";
    /// Filter engine target.
    pub const FILTER: &str = "horizon_arbor::filter";
    /// Serializer target.
    pub const SERIALIZER: &str = "horizon_arbor::serializer";
    /// Drag/drop target.
    pub const DRAG_DROP: &str = "horizon_arbor::drag_drop";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to append each node's annotation (key, flags).
    pub show_annotations: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_annotations: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output (labels only).
    pub fn minimal() -> Self {
        Self {
            show_annotations: false,
            ..Default::default()
        }
    }
}

/// A hierarchy that [`TreeDebug`] can walk.
pub trait TreeSource {
    /// Node identifier type.
    type Id: Copy;

    /// Top-level nodes in display order.
    fn root_ids(&self) -> Vec<Self::Id>;

    /// Children of `id` in display order.
    fn child_ids(&self, id: Self::Id) -> Vec<Self::Id>;

    /// Primary text for `id`.
    fn node_label(&self, id: Self::Id) -> String;

    /// Optional bracketed annotation shown after the label.
    fn node_annotation(&self, _id: Self::Id) -> Option<String> {
        None
    }
}

/// Debug utility for visualizing node forests.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole forest.
    pub fn format<S: TreeSource>(&self, source: &S) -> String {
        let roots = source.root_ids();
        let mut output = String::new();
        if roots.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }
        let count = roots.len();
        for (i, id) in roots.into_iter().enumerate() {
            self.format_subtree_into(source, id, 0, i == count - 1, &mut Vec::new(), &mut output);
        }
        output
    }

    fn format_subtree_into<S: TreeSource>(
        &self,
        source: &S,
        id: S::Id,
        depth: usize,
        is_last: bool,
        open_levels: &mut Vec<bool>,
        output: &mut String,
    ) {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return;
        }

        output.push_str(&self.build_prefix(depth, is_last, open_levels));
        output.push_str(&source.node_label(id));

        if self.options.show_annotations
            && let Some(annotation) = source.node_annotation(id)
        {
            write!(output, " [{annotation}]").expect("write to String");
        }
        output.push('\n');

        let children = source.child_ids(id);
        let child_count = children.len();
        open_levels.push(!is_last);
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(source, child, depth + 1, i == child_count - 1, open_levels, output);
        }
        open_levels.pop();
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, depth: usize, is_last: bool, open_levels: &[bool]) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();

        // Skip the root level; it never draws a continuation line.
        for &open in open_levels.iter().skip(1) {
            prefix.push_str(if open { branch } else { " " });
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }

        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that emits a tracing span when dropped.
///
/// This is useful for tracking the duration of filter and serialization passes.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_arbor::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` crate macros with consistent
/// target naming.
#[macro_export]
macro_rules! arbor_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_arbor_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! arbor_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_arbor_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! arbor_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "horizon_arbor_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! arbor_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_arbor_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! arbor_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "horizon_arbor_core", $($arg)*)
    };
}
