//! Plugin records: attribution references, resolved manifest entries, and
//! the hook surfaces a plugin can implement.
//!
//! Two views of a plugin exist in the store. [`PluginRef`] is the light
//! attribution record actions and status entries carry. [`ResolvedPlugin`]
//! is the full manifest entry produced by plugin resolution: where the
//! plugin lives on disk, its options, and which hooks it implements.

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::digest::{DigestError, content_digest_of};
use crate::types::ContentDigest;

/// Attribution record identifying a plugin.
///
/// Carried on actions so every state transition can be traced back to the
/// plugin that requested it. Plugins may attach arbitrary extra metadata;
/// unknown keys survive round-trips through `extras`.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::plugin::PluginRef;
///
/// let plugin = PluginRef::new("plugin-3f9c", "source-filesystem", "4.2.0");
/// assert_eq!(plugin.name, "source-filesystem");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginRef {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub extras: FxHashMap<String, Value>,
}

impl PluginRef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            extras: FxHashMap::default(),
        }
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Build-side hooks a plugin can implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeApi {
    OnPreBootstrap,
    OnPostBootstrap,
    OnCreateBundlerConfig,
    OnCreatePage,
    SourceNodes,
    CreatePagesStatefully,
    CreatePages,
    OnPostBuild,
}

impl NodeApi {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeApi::OnPreBootstrap => "onPreBootstrap",
            NodeApi::OnPostBootstrap => "onPostBootstrap",
            NodeApi::OnCreateBundlerConfig => "onCreateBundlerConfig",
            NodeApi::OnCreatePage => "onCreatePage",
            NodeApi::SourceNodes => "sourceNodes",
            NodeApi::CreatePagesStatefully => "createPagesStatefully",
            NodeApi::CreatePages => "createPages",
            NodeApi::OnPostBuild => "onPostBuild",
        }
    }
}

impl fmt::Display for NodeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Browser runtime hooks a plugin can implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BrowserApi {
    OnRouteUpdate,
    RegisterServiceWorker,
    OnServiceWorkerActive,
    OnPostPrefetchPathname,
}

impl BrowserApi {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserApi::OnRouteUpdate => "onRouteUpdate",
            BrowserApi::RegisterServiceWorker => "registerServiceWorker",
            BrowserApi::OnServiceWorkerActive => "onServiceWorkerActive",
            BrowserApi::OnPostPrefetchPathname => "onPostPrefetchPathname",
        }
    }
}

impl fmt::Display for BrowserApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server-rendering hooks a plugin can implement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SsrApi {
    OnPreRenderHtml,
    OnRenderBody,
}

impl SsrApi {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SsrApi::OnPreRenderHtml => "onPreRenderHtml",
            SsrApi::OnRenderBody => "onRenderBody",
        }
    }
}

impl fmt::Display for SsrApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options block of a resolved plugin.
///
/// `plugins` holds nested sub-plugin references (theme composition produces
/// these); everything else the site config passed stays in `extras`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginOptions {
    #[serde(default)]
    pub plugins: Vec<Value>,
    #[serde(flatten)]
    pub extras: FxHashMap<String, Value>,
}

/// Fully resolved plugin manifest entry.
///
/// Produced by plugin resolution (outside this crate) and stored flat so
/// the engine can dispatch hooks without touching the module system again.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlugin {
    /// Directory the plugin was resolved to.
    pub resolve: PathBuf,
    pub id: String,
    pub name: String,
    pub version: String,
    pub plugin_options: PluginOptions,
    pub node_apis: Vec<NodeApi>,
    pub browser_apis: Vec<BrowserApi>,
    pub ssr_apis: Vec<SsrApi>,
    /// Entry file of the plugin.
    pub plugin_filepath: PathBuf,
}

impl ResolvedPlugin {
    /// Returns `true` if the plugin implements the given build-side hook.
    #[must_use]
    pub fn implements(&self, api: NodeApi) -> bool {
        self.node_apis.contains(&api)
    }
}

/// Digest of the full resolved-plugin list.
///
/// Stored alongside plugin status; a changed hash between runs tells the
/// engine the cache must be invalidated.
pub fn plugins_hash(plugins: &[ResolvedPlugin]) -> Result<ContentDigest, DigestError> {
    content_digest_of(&plugins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names_serialize_camel_case() {
        let json = serde_json::to_string(&NodeApi::OnCreateBundlerConfig).unwrap();
        assert_eq!(json, "\"onCreateBundlerConfig\"");
        let parsed: NodeApi = serde_json::from_str("\"sourceNodes\"").unwrap();
        assert_eq!(parsed, NodeApi::SourceNodes);
    }

    #[test]
    fn test_plugins_hash_changes_with_options() {
        let mut plugin = ResolvedPlugin {
            name: "transformer-remark".to_string(),
            ..Default::default()
        };
        let before = plugins_hash(std::slice::from_ref(&plugin)).unwrap();
        plugin
            .plugin_options
            .extras
            .insert("footnotes".to_string(), Value::Bool(true));
        let after = plugins_hash(&[plugin]).unwrap();
        assert_ne!(before, after);
    }
}
