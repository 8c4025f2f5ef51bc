//! Accent- and case-insensitive filtering.
//!
//! A filter pass never mutates the original forest. It produces a
//! [`FilteredForest`]: the surviving roots plus, for every surviving node
//! whose children were pruned, an override holding the kept children and the
//! forced expanded flag. Nodes without an override read straight through to
//! the [`NodeStore`], so a lenient direct match keeps its whole subtree
//! without copying it.
//!
//! # Modes
//!
//! - [`FilterMode::Lenient`]: a node that matches keeps its entire subtree;
//!   otherwise it survives only if some descendant matches, with its children
//!   pruned to the matching ones and `expanded` forced on.
//! - [`FilterMode::Strict`]: children are always pruned to matching
//!   descendants; a node survives if it matches or any descendant does.
//!
//! Case folding follows a [`FilterLocale`], so a Turkish filter folds `I` to
//! `ı` rather than `i`.

use std::collections::HashMap;

use horizon_arbor_core::{PerfSpan, span_names};
use icu::casemap::CaseMapper;
use icu::locale::{LanguageIdentifier, Locale};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::node::{NodeEntry, NodeId, TreeNode};
use super::store::{Hierarchy, NodeStore, export_forest};

/// How matches propagate through the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Matching nodes keep their whole subtree.
    #[default]
    Lenient,
    /// Only matching descendants are kept.
    Strict,
}

/// Folds text for comparison: compatibility decomposition, combining marks
/// removed, then lowercased.
///
/// ```
/// use horizon_arbor::tree::filter::normalize;
///
/// assert_eq!(normalize("Crème Brûlée"), "creme brulee");
/// assert_eq!(normalize("ÅNGSTRÖM"), "angstrom");
/// ```
pub fn normalize(text: &str) -> String {
    FilterLocale::ROOT.fold(text)
}

/// The language whose case rules the filter folds with.
///
/// The root locale applies the untailored Unicode mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterLocale(Option<LanguageIdentifier>);

impl FilterLocale {
    /// Untailored case folding.
    pub const ROOT: Self = Self(None);

    /// Parses a BCP 47 tag such as `"tr"` or `"lt-LT"`.
    pub fn parse(tag: &str) -> Option<Self> {
        let locale: Locale = tag.parse().ok()?;
        Some(Self(Some(locale.id)))
    }

    /// Folds text for comparison: compatibility decomposition, combining
    /// marks removed, then lowercased under this locale.
    pub fn fold(&self, text: &str) -> String {
        let stripped: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
        match &self.0 {
            Some(id) => String::from(CaseMapper::new().lowercase_to_string(&stripped, id)),
            None => stripped.to_lowercase(),
        }
    }
}

/// The node fields a filter reads, parsed from a comma-separated list such as
/// `"label,data.owner"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFields(Vec<String>);

impl FilterFields {
    /// Parses a comma-separated field list. Blank entries are dropped.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The field paths in order.
    pub fn paths(&self) -> &[String] {
        &self.0
    }
}

impl Default for FilterFields {
    fn default() -> Self {
        Self(vec!["label".to_string()])
    }
}

/// Reads a field path from a node as text.
///
/// `key`, `label` and `type` address the node's own properties; `data`
/// addresses the payload, and further dot-separated segments descend into
/// JSON objects. Strings are used as-is, numbers and booleans are rendered.
/// Missing or non-scalar values yield `None` and never match.
pub fn resolve_field(entry: &NodeEntry, path: &str) -> Option<String> {
    let mut segments = path.split('.');
    let head = segments.next()?;
    let rest: Vec<&str> = segments.collect();

    let scalar_text = |value: &str| rest.is_empty().then(|| value.to_string());
    match head {
        "key" => scalar_text(entry.key()?),
        "label" => scalar_text(entry.label()?),
        "type" => scalar_text(entry.node_type()?),
        "data" => {
            let mut value = entry.data()?;
            for segment in &rest {
                value = value.as_object()?.get(*segment)?;
            }
            match value {
                serde_json::Value::String(text) => Some(text.clone()),
                serde_json::Value::Number(number) => Some(number.to_string()),
                serde_json::Value::Bool(flag) => Some(flag.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Children and expanded state of a surviving node whose children were pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilterOverride {
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: bool,
}

/// The result of a filter pass.
#[derive(Debug, Clone, Default)]
pub struct FilteredForest {
    query: String,
    roots: Vec<NodeId>,
    overrides: HashMap<NodeId, FilterOverride>,
}

impl FilteredForest {
    /// Runs a filter pass over `store` with untailored case folding.
    ///
    /// An empty `query` yields an empty forest; callers treat that as "no
    /// filter" rather than calling this.
    pub fn build(store: &NodeStore, query: &str, fields: &FilterFields, mode: FilterMode) -> Self {
        Self::build_localized(store, query, fields, mode, &FilterLocale::ROOT)
    }

    /// Runs a filter pass over `store`, folding case under `locale`.
    pub fn build_localized(
        store: &NodeStore,
        query: &str,
        fields: &FilterFields,
        mode: FilterMode,
        locale: &FilterLocale,
    ) -> Self {
        let _perf = PerfSpan::new(span_names::FILTER);
        let mut matcher = Matcher {
            store,
            needle: locale.fold(query),
            fields,
            mode,
            locale,
            overrides: HashMap::new(),
        };

        let roots: Vec<NodeId> = store
            .roots()
            .iter()
            .copied()
            .filter(|&id| matcher.keep(id))
            .collect();

        tracing::debug!(
            target: "horizon_arbor::filter",
            query,
            ?mode,
            roots = roots.len(),
            pruned = matcher.overrides.len(),
            "filter applied"
        );

        Self {
            query: query.to_string(),
            roots,
            overrides: matcher.overrides,
        }
    }

    /// The query this forest was built from.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Surviving top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Whether nothing survived.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// A [`Hierarchy`] over this forest.
    pub fn view<'a>(&'a self, store: &'a NodeStore) -> FilteredView<'a> {
        FilteredView { store, forest: self }
    }

    /// Rebuilds the surviving nodes as owned payloads.
    pub fn export(&self, store: &NodeStore) -> Vec<TreeNode> {
        export_forest(&self.view(store), |_| false)
    }

    /// Expands or collapses a node inside the filtered view without touching
    /// the original. Returns `true` if the visible state changed.
    pub(crate) fn set_expanded(&mut self, store: &NodeStore, id: NodeId, expanded: bool) -> bool {
        let current = self.view(store).is_expanded(id);
        if current == expanded {
            return false;
        }
        let entry = self.overrides.entry(id).or_insert_with(|| FilterOverride {
            children: store.children(id).to_vec(),
            expanded: current,
        });
        entry.expanded = expanded;
        true
    }
}

struct Matcher<'a> {
    store: &'a NodeStore,
    needle: String,
    fields: &'a FilterFields,
    mode: FilterMode,
    locale: &'a FilterLocale,
    overrides: HashMap<NodeId, FilterOverride>,
}

impl Matcher<'_> {
    fn matches(&self, id: NodeId) -> bool {
        let Some(entry) = self.store.get(id) else {
            return false;
        };
        self.fields.paths().iter().any(|path| {
            resolve_field(entry, path).is_some_and(|text| self.locale.fold(&text).contains(&self.needle))
        })
    }

    fn keep(&mut self, id: NodeId) -> bool {
        let direct = self.matches(id);
        if direct && self.mode == FilterMode::Lenient {
            return true;
        }

        let store = self.store;
        let original = store.children(id);
        let kept: Vec<NodeId> = original.iter().copied().filter(|&child| self.keep(child)).collect();
        let descendant_match = !kept.is_empty();

        if !descendant_match && !direct {
            return false;
        }
        if !original.is_empty() {
            let expanded = descendant_match || store.is_expanded(id);
            self.overrides.insert(id, FilterOverride { children: kept, expanded });
        }
        true
    }
}

/// A [`FilteredForest`] paired with the store it was built from.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    store: &'a NodeStore,
    forest: &'a FilteredForest,
}

impl Hierarchy for FilteredView<'_> {
    fn store(&self) -> &NodeStore {
        self.store
    }

    fn root_ids(&self) -> &[NodeId] {
        &self.forest.roots
    }

    fn child_ids(&self, id: NodeId) -> &[NodeId] {
        match self.forest.overrides.get(&id) {
            Some(entry) => &entry.children,
            None => self.store.children(id),
        }
    }

    fn is_expanded(&self, id: NodeId) -> bool {
        match self.forest.overrides.get(&id) {
            Some(entry) => entry.expanded,
            None => self.store.is_expanded(id),
        }
    }
}
