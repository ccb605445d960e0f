//! Query bookkeeping: extracted queries per template, registered static
//! queries, and the node/connection dependencies of page queries.
//!
//! The dependency tables answer the develop-mode question "which pages must
//! re-run their query because this node changed". They map node ids and
//! type names to the set of page paths whose last query run touched them.

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// A static query registered by a component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticQueryComponent {
    /// Display name of the owning component.
    pub name: String,
    /// Source file the query was extracted from.
    pub component_path: PathBuf,
    /// Stable id of the static query.
    pub id: String,
    /// The query text.
    pub query: String,
    /// Hash of the query text, used to key result files.
    pub hash: String,
}

/// Per-template query record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Source file of the template component.
    pub component_path: PathBuf,
    /// Query extracted from the template; empty until extraction ran.
    #[serde(default)]
    pub query: String,
    /// Paths of pages rendered by this template.
    #[serde(default)]
    pub pages: FxHashSet<String>,
    /// Still within the initial bootstrap query run.
    #[serde(default = "default_in_bootstrap")]
    pub is_in_bootstrap: bool,
}

fn default_in_bootstrap() -> bool {
    true
}

impl ComponentRecord {
    pub fn new(component_path: impl Into<PathBuf>) -> Self {
        Self {
            component_path: component_path.into(),
            query: String::new(),
            pages: FxHashSet::default(),
            is_in_bootstrap: true,
        }
    }
}

impl Default for ComponentRecord {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

/// Reverse dependency tables from data to the pages that consume it.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::query::ComponentDependencies;
///
/// let mut deps = ComponentDependencies::default();
/// deps.record_node_dependency("post-1", "/blog/one/");
/// deps.record_connection_dependency("MarkdownPost", "/blog/");
///
/// assert!(deps.paths_depending_on_node("post-1").contains("/blog/one/"));
///
/// // A deleted page drops out of every table
/// deps.drop_paths(&["/blog/one/".to_string()]);
/// assert!(deps.paths_depending_on_node("post-1").is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDependencies {
    /// Node id -> paths of pages whose query read that node.
    #[serde(default)]
    pub nodes: FxHashMap<NodeId, FxHashSet<String>>,
    /// Type name -> paths of pages whose query listed nodes of that type.
    #[serde(default)]
    pub connections: FxHashMap<String, FxHashSet<String>>,
}

impl ComponentDependencies {
    /// Records that the page at `path` read the node with `node_id`.
    pub fn record_node_dependency(&mut self, node_id: impl Into<NodeId>, path: impl Into<String>) {
        self.nodes.entry(node_id.into()).or_default().insert(path.into());
    }

    /// Records that the page at `path` listed nodes of `type_name`.
    pub fn record_connection_dependency(
        &mut self,
        type_name: impl Into<String>,
        path: impl Into<String>,
    ) {
        self.connections
            .entry(type_name.into())
            .or_default()
            .insert(path.into());
    }

    /// Removes the given page paths from every dependency set, pruning
    /// entries that end up empty.
    pub fn drop_paths(&mut self, paths: &[String]) {
        for set in self.nodes.values_mut() {
            for path in paths {
                set.remove(path);
            }
        }
        self.nodes.retain(|_, set| !set.is_empty());
        for set in self.connections.values_mut() {
            for path in paths {
                set.remove(path);
            }
        }
        self.connections.retain(|_, set| !set.is_empty());
    }

    /// Page paths whose queries read the given node.
    #[must_use]
    pub fn paths_depending_on_node(&self, node_id: &str) -> FxHashSet<String> {
        self.nodes.get(node_id).cloned().unwrap_or_default()
    }

    /// Page paths whose queries listed the given type.
    #[must_use]
    pub fn paths_depending_on_connection(&self, type_name: &str) -> FxHashSet<String> {
        self.connections.get(type_name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_paths_prunes_empty_entries() {
        let mut deps = ComponentDependencies::default();
        deps.record_node_dependency("n1", "/a/");
        deps.record_node_dependency("n1", "/b/");
        deps.record_connection_dependency("Post", "/a/");

        deps.drop_paths(&["/a/".to_string()]);

        assert_eq!(deps.paths_depending_on_node("n1").len(), 1);
        assert!(deps.connections.is_empty());
    }
}
