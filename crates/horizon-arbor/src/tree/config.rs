//! Engine configuration.
//!
//! Configuration can be built in code with the `with_*` builders or loaded
//! from TOML. Every field is optional in TOML; missing fields take the
//! defaults shown below.
//!
//! ```toml
//! selection_mode = "checkbox"      # "single" | "multiple" | "checkbox"; omit to disable
//! meta_key_selection = false
//! propagate_selection_up = true
//! propagate_selection_down = true
//! filter_by = "label"              # comma-separated field paths
//! filter_mode = "lenient"          # "lenient" | "strict"
//! filter_locale = "tr"             # BCP 47 tag for case folding; omit for the root locale
//! draggable_nodes = false
//! droppable_nodes = false
//! draggable_scope = "files"        # a name or a list of names
//! droppable_scope = ["files", "images"]
//! validate_drop = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::drag_drop::DragScope;
use super::filter::{FilterFields, FilterLocale, FilterMode};
use super::selection::SelectionMode;
use crate::error::{Result, TreeError};

/// Behaviour switches for a [`TreeEngine`](super::TreeEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Selection mode; `None` disables selection.
    pub selection_mode: Option<SelectionMode>,
    /// Plain clicks select only the clicked node; Ctrl/Meta clicks toggle
    /// membership.
    pub meta_key_selection: bool,
    /// Checkbox mode: re-derive ancestors after a toggle.
    pub propagate_selection_up: bool,
    /// Checkbox mode: apply a toggle to the whole subtree.
    pub propagate_selection_down: bool,
    /// Comma-separated field paths the filter reads.
    pub filter_by: String,
    /// How filter matches propagate.
    pub filter_mode: FilterMode,
    /// Language tag whose case rules the filter folds with.
    pub filter_locale: Option<String>,
    /// Tree-level drag toggle.
    pub draggable_nodes: bool,
    /// Tree-level drop toggle.
    pub droppable_nodes: bool,
    /// Scope attached to drags started in this tree.
    pub draggable_scope: Option<DragScope>,
    /// Scopes this tree accepts drops from.
    pub droppable_scope: Option<DragScope>,
    /// Hold legal drops for explicit acceptance.
    pub validate_drop: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            selection_mode: None,
            meta_key_selection: false,
            propagate_selection_up: true,
            propagate_selection_down: true,
            filter_by: "label".to_string(),
            filter_mode: FilterMode::Lenient,
            filter_locale: None,
            draggable_nodes: false,
            droppable_nodes: false,
            draggable_scope: None,
            droppable_scope: None,
            validate_drop: false,
        }
    }
}

impl TreeConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: "horizon_arbor::engine", path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// The parsed filter field list.
    pub fn filter_fields(&self) -> FilterFields {
        FilterFields::parse(&self.filter_by)
    }

    /// The parsed filter locale. An unparsable tag falls back to the root
    /// locale.
    pub fn filter_locale(&self) -> FilterLocale {
        let Some(tag) = self.filter_locale.as_deref() else {
            return FilterLocale::ROOT;
        };
        FilterLocale::parse(tag).unwrap_or_else(|| {
            tracing::warn!(target: "horizon_arbor::filter", tag, "unrecognized filter locale, using root");
            FilterLocale::ROOT
        })
    }

    /// Set the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = Some(mode);
        self
    }

    /// Enable or disable modifier-key selection.
    pub fn with_meta_key_selection(mut self, enabled: bool) -> Self {
        self.meta_key_selection = enabled;
        self
    }

    /// Set checkbox propagation.
    pub fn with_propagation(mut self, up: bool, down: bool) -> Self {
        self.propagate_selection_up = up;
        self.propagate_selection_down = down;
        self
    }

    /// Set the filter field list.
    pub fn with_filter_by(mut self, fields: impl Into<String>) -> Self {
        self.filter_by = fields.into();
        self
    }

    /// Set the filter mode.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Set the locale the filter folds case with.
    pub fn with_filter_locale(mut self, tag: impl Into<String>) -> Self {
        self.filter_locale = Some(tag.into());
        self
    }

    /// Enable dragging and dropping within the tree.
    pub fn with_drag_drop(mut self, draggable: bool, droppable: bool) -> Self {
        self.draggable_nodes = draggable;
        self.droppable_nodes = droppable;
        self
    }

    /// Set the drag and drop scopes.
    pub fn with_scopes(mut self, draggable: Option<DragScope>, droppable: Option<DragScope>) -> Self {
        self.draggable_scope = draggable;
        self.droppable_scope = droppable;
        self
    }

    /// Hold drops for explicit acceptance.
    pub fn with_validate_drop(mut self, enabled: bool) -> Self {
        self.validate_drop = enabled;
        self
    }
}
