//! Site configuration as loaded from the site's config file.
//!
//! The store keeps the parsed configuration verbatim; validating it and
//! resolving the plugin specs it names happen upstream.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed site configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// Plugins the site enables, in declaration order.
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
    /// Free-form metadata exposed to queries.
    #[serde(default)]
    pub site_metadata: SiteMetadata,
    /// Deprecated polyfill toggle, preserved for old config files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyfill: Option<bool>,
    /// Develop-server middleware hook, opaque to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub develop_middleware: Option<Value>,
    /// Develop-server proxy rules, opaque to the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Value>,
    /// Path prefix the site is served under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
    /// Node-to-node field mappings (`"Post.author" -> "Author.email"`).
    #[serde(default)]
    pub mapping: FxHashMap<String, String>,
}

/// One plugin entry of the site configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    /// Package name or local path to resolve.
    pub resolve: String,
    #[serde(default)]
    pub options: FxHashMap<String, Value>,
}

impl PluginSpec {
    pub fn new(resolve: impl Into<String>) -> Self {
        Self {
            resolve: resolve.into(),
            options: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Site metadata block.
///
/// The well-known keys get typed fields; anything else the site author adds
/// is preserved in `extras`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(flatten)]
    pub extras: FxHashMap<String, Value>,
}
