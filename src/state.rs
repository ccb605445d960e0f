//! The global build-state aggregate and its cached projection.
//!
//! [`BuildState`] is the single snapshot of everything a build knows:
//! sourced nodes, registered pages, plugin records, query bookkeeping, the
//! job ledgers, bundler state, and diagnostics. It is a plain aggregate;
//! the external build engine owns it and interprets [`crate::action::Action`]
//! messages into mutations of it; the store only provides the shape and the
//! index-maintenance helpers the engine and cache hydration rely on.
//!
//! [`CachedState`] is the subset of the aggregate that survives between
//! builds. Everything derivable (the type index), process-bound (the schema
//! handle, bundler config), or transient (logs, the last action) is excluded
//! and rebuilt or re-accumulated on the next run.
//!
//! # Examples
//!
//! ```rust
//! use siteloom_store::node::ContentNode;
//! use siteloom_store::state::BuildState;
//!
//! let mut state = BuildState::default();
//! let node = ContentNode::builder("post-1", "MarkdownPost").build().unwrap();
//! state.insert_node(node);
//!
//! assert_eq!(state.nodes_of_type("MarkdownPost").count(), 1);
//!
//! // Round-trip through the cached projection rebuilds the type index.
//! let restored = BuildState::from_cached(state.to_cached());
//! assert_eq!(restored.nodes_of_type("MarkdownPost").count(), 1);
//! ```

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;
use crate::bundler::{BundlerConfig, TransformStages};
use crate::config::SiteConfig;
use crate::diagnostics::DiagnosticLedger;
use crate::jobs::{JobV2Ledger, LegacyJobLedger};
use crate::node::ContentNode;
use crate::page::{Page, Redirect};
use crate::plugin::{PluginRef, ResolvedPlugin};
use crate::query::{ComponentDependencies, ComponentRecord, StaticQueryComponent};
use crate::schema::{CompiledSchema, InferenceMetadata, SchemaCustomization};
use crate::types::{ContentDigest, NodeId, Program};

// ============================================================================
// Plugin Status
// ============================================================================

/// Plugin bookkeeping the engine consults on startup.
///
/// `plugins_hash` is the digest of the full resolved-plugin list from the
/// previous run; when it differs from the current one the persisted cache
/// is invalid and gets discarded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    /// Per-plugin status records, keyed by plugin name.
    #[serde(default)]
    pub plugins: FxHashMap<String, PluginRef>,
    /// Digest of the resolved-plugin list (see [`crate::plugin::plugins_hash`]).
    #[serde(default)]
    pub plugins_hash: ContentDigest,
}

// ============================================================================
// The Aggregate
// ============================================================================

/// The complete state of one build process.
///
/// Owned exclusively by the build engine's reducer; nothing in this crate
/// mutates it behind the caller's back. Fields are grouped the way the
/// action vocabulary is: nodes, pages, queries, schema, plugins, bundler,
/// jobs, page data, diagnostics.
#[derive(Clone, Debug, Default)]
pub struct BuildState {
    /// The CLI invocation this state was created under.
    pub program: Program,

    // ---- Nodes ----
    /// Source-of-truth node table.
    pub nodes: FxHashMap<NodeId, ContentNode>,
    /// Secondary index: data-layer type name -> ids of nodes of that type.
    /// Maintained by [`insert_node`](Self::insert_node) /
    /// [`remove_node`](Self::remove_node), never persisted, rebuilt by
    /// [`from_cached`](Self::from_cached).
    pub nodes_by_type: FxHashMap<String, FxHashSet<NodeId>>,
    /// Materialized resolver output per type, keyed by type name.
    pub resolved_nodes_cache: FxHashMap<String, Value>,
    /// Nodes touched this run; untouched nodes are swept as stale between
    /// builds.
    pub nodes_touched: FxHashSet<NodeId>,

    /// The most recent action the reducer processed.
    pub last_action: Option<Action>,

    // ---- Plugins and configuration ----
    /// Resolved plugin manifest entries, in load order.
    pub flattened_plugins: Vec<ResolvedPlugin>,
    /// Parsed site configuration.
    pub config: SiteConfig,
    /// Plugin status and the plugins hash.
    pub status: StoreStatus,

    // ---- Pages ----
    /// Registered pages, keyed by public path.
    pub pages: FxHashMap<String, Page>,
    /// The redirect table, in registration order.
    pub redirects: Vec<Redirect>,

    // ---- Schema ----
    /// The compiled data-layer schema. Process-bound; never cached.
    pub schema: CompiledSchema,
    /// Accumulated schema-customization inputs.
    pub schema_customization: SchemaCustomization,
    /// Type-inference progress over sourced nodes.
    pub inference_metadata: InferenceMetadata,

    // ---- Queries ----
    /// Reverse dependencies from data to the pages that consume it.
    pub component_data_dependencies: ComponentDependencies,
    /// Per-template query records, keyed by component path.
    pub components: FxHashMap<PathBuf, ComponentRecord>,
    /// Registered static queries, keyed by static-query id.
    pub static_query_components: FxHashMap<NodeId, StaticQueryComponent>,

    // ---- Jobs ----
    /// Legacy id-keyed job ledger.
    pub jobs: LegacyJobLedger,
    /// Digest-keyed job ledger.
    pub jobs_v2: JobV2Ledger,

    // ---- Bundler ----
    /// The assembled bundler configuration.
    pub bundler: BundlerConfig,
    /// Output hash of the last bundler compilation.
    pub compilation_hash: ContentDigest,
    /// Per-stage script-transform options.
    pub transforms: TransformStages,
    /// Resolved theme list, opaque to the store.
    pub themes: Value,

    // ---- Page data ----
    /// Size of each written page-data file.
    pub page_data_stats: FxHashMap<PathBuf, u64>,
    /// Query result hash per page, keyed by page path.
    pub page_data: FxHashMap<NodeId, String>,

    // ---- Diagnostics ----
    /// Reporter event ledger for this build.
    pub logs: DiagnosticLedger,

    /// Highest insertion counter handed out so far.
    node_counter: u64,
}

impl BuildState {
    /// Creates the empty aggregate for a program invocation.
    pub fn new(program: Program) -> Self {
        Self {
            program,
            ..Default::default()
        }
    }

    /// Inserts a node, assigning its insertion counter and keeping
    /// `nodes_by_type` consistent.
    ///
    /// Re-inserting an id replaces the stored node; if its type changed,
    /// the id moves between index buckets.
    pub fn insert_node(&mut self, mut node: ContentNode) {
        if let Some(previous) = self.nodes.get(&node.id) {
            let previous_type = previous.internal.type_name.clone();
            // Replacement keeps the original creation order.
            node.internal.counter = previous.internal.counter;
            if previous_type != node.internal.type_name {
                self.unindex(&previous_type, &node.id);
            }
        } else {
            self.node_counter += 1;
            node.internal.counter = self.node_counter;
        }
        self.nodes_by_type
            .entry(node.internal.type_name.clone())
            .or_default()
            .insert(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Removes a node by id, cleaning the type index and the touched set.
    ///
    /// Returns the removed node, or `None` when no node had that id.
    pub fn remove_node(&mut self, id: &str) -> Option<ContentNode> {
        let node = self.nodes.remove(id)?;
        self.unindex(&node.internal.type_name, id);
        self.nodes_touched.remove(id);
        Some(node)
    }

    fn unindex(&mut self, type_name: &str, id: &str) {
        if let Some(ids) = self.nodes_by_type.get_mut(type_name) {
            ids.remove(id);
            if ids.is_empty() {
                self.nodes_by_type.remove(type_name);
            }
        }
    }

    /// Marks a node as touched this run, exempting it from the stale sweep.
    pub fn touch_node(&mut self, id: impl Into<NodeId>) {
        self.nodes_touched.insert(id.into());
    }

    /// The nodes of one data-layer type, in no particular order.
    pub fn nodes_of_type<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a ContentNode> {
        self.nodes_by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ContentNode> {
        self.nodes.get(id)
    }

    /// Projects the slices that persist between builds.
    #[must_use]
    pub fn to_cached(&self) -> CachedState {
        CachedState {
            nodes: Some(self.nodes.clone()),
            status: Some(self.status.clone()),
            component_data_dependencies: Some(self.component_data_dependencies.clone()),
            components: Some(self.components.clone()),
            jobs_v2: Some(self.jobs_v2.clone()),
            static_query_components: Some(self.static_query_components.clone()),
            compilation_hash: Some(self.compilation_hash.clone()),
            page_data_stats: Some(self.page_data_stats.clone()),
            page_data: Some(self.page_data.clone()),
        }
    }

    /// Hydrates a fresh aggregate from a cached projection.
    ///
    /// Absent slices stay at their defaults. The type index and the
    /// insertion counter are rebuilt from the node table rather than
    /// restored, so they can never disagree with it.
    #[must_use]
    pub fn from_cached(cached: CachedState) -> Self {
        let mut state = BuildState::default();
        if let Some(nodes) = cached.nodes {
            for node in nodes.into_values() {
                state.node_counter = state.node_counter.max(node.internal.counter);
                state
                    .nodes_by_type
                    .entry(node.internal.type_name.clone())
                    .or_default()
                    .insert(node.id.clone());
                state.nodes.insert(node.id.clone(), node);
            }
        }
        if let Some(status) = cached.status {
            state.status = status;
        }
        if let Some(deps) = cached.component_data_dependencies {
            state.component_data_dependencies = deps;
        }
        if let Some(components) = cached.components {
            state.components = components;
        }
        if let Some(jobs_v2) = cached.jobs_v2 {
            state.jobs_v2 = jobs_v2;
        }
        if let Some(static_queries) = cached.static_query_components {
            state.static_query_components = static_queries;
        }
        if let Some(hash) = cached.compilation_hash {
            state.compilation_hash = hash;
        }
        if let Some(stats) = cached.page_data_stats {
            state.page_data_stats = stats;
        }
        if let Some(page_data) = cached.page_data {
            state.page_data = page_data;
        }
        state
    }
}

// ============================================================================
// The Cached Projection
// ============================================================================

/// The subset of [`BuildState`] persisted between builds.
///
/// Every slice is optional so partial snapshots (and snapshots written
/// before a slice existed) hydrate cleanly. Only serde-plain data appears
/// here: no schema handle, no bundler config, no logs, no last action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<FxHashMap<NodeId, ContentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StoreStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_data_dependencies: Option<ComponentDependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<FxHashMap<PathBuf, ComponentRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs_v2: Option<JobV2Ledger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_query_components: Option<FxHashMap<NodeId, StaticQueryComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_hash: Option<ContentDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_data_stats: Option<FxHashMap<PathBuf, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_data: Option<FxHashMap<NodeId, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, type_name: &str) -> ContentNode {
        ContentNode::builder(id, type_name).build().unwrap()
    }

    #[test]
    fn test_insert_assigns_monotonic_counters() {
        let mut state = BuildState::default();
        state.insert_node(node("a", "Post"));
        state.insert_node(node("b", "Post"));
        assert_eq!(state.node("a").unwrap().internal.counter, 1);
        assert_eq!(state.node("b").unwrap().internal.counter, 2);
    }

    #[test]
    fn test_reinsert_keeps_counter_and_moves_index() {
        let mut state = BuildState::default();
        state.insert_node(node("a", "Post"));
        state.insert_node(node("a", "Page"));

        assert_eq!(state.node("a").unwrap().internal.counter, 1);
        assert!(!state.nodes_by_type.contains_key("Post"));
        assert_eq!(state.nodes_of_type("Page").count(), 1);
    }

    #[test]
    fn test_remove_cleans_index_and_touched() {
        let mut state = BuildState::default();
        state.insert_node(node("a", "Post"));
        state.touch_node("a");

        let removed = state.remove_node("a");
        assert!(removed.is_some());
        assert!(state.nodes_by_type.is_empty());
        assert!(state.nodes_touched.is_empty());
        assert!(state.remove_node("a").is_none());
    }

    #[test]
    fn test_hydration_rebuilds_index_and_counter() {
        let mut state = BuildState::default();
        state.insert_node(node("a", "Post"));
        state.insert_node(node("b", "Author"));

        let mut restored = BuildState::from_cached(state.to_cached());
        assert_eq!(restored.nodes_of_type("Post").count(), 1);
        assert_eq!(restored.nodes_of_type("Author").count(), 1);

        // New inserts continue numbering past the restored nodes.
        restored.insert_node(node("c", "Post"));
        assert_eq!(restored.node("c").unwrap().internal.counter, 3);
    }

    #[test]
    fn test_hydration_with_absent_slices() {
        let state = BuildState::from_cached(CachedState {
            compilation_hash: Some("abc".to_string()),
            ..Default::default()
        });
        assert!(state.nodes.is_empty());
        assert!(state.nodes_by_type.is_empty());
        assert_eq!(state.compilation_hash, "abc");
    }
}
