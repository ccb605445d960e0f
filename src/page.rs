//! Page registry entries and redirects.
//!
//! A [`Page`] records one routable page of the site: its public path, the
//! template component that renders it, and the context object page queries
//! run against. [`Redirect`] is the matching entry for the redirect table.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::NodeId;

/// One routable page of the site.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::page::Page;
/// use serde_json::json;
///
/// let page = Page::new("/blog/hello/", "/site/src/templates/post.js")
///     .with_context("slug", json!("/blog/hello/"));
///
/// assert_eq!(page.internal_component_name, "ComponentBlogHello");
/// assert!(page.component_chunk_name.starts_with("component---"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Public path of the page (`/blog/hello/`).
    pub path: String,
    /// Synthetic component name derived from the path, used by the data
    /// layer to key page objects.
    pub internal_component_name: String,
    /// Client-side matching pattern for dynamic routes (`/app/*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_path: Option<String>,
    /// Absolute path of the template component that renders this page.
    pub component: PathBuf,
    /// Bundler chunk name derived from the component path.
    pub component_chunk_name: String,
    /// Created by the stateful page hook; such pages are exempt from the
    /// stale-page sweep between builds.
    #[serde(default)]
    pub is_stateful: bool,
    /// Context object made available to the page query.
    #[serde(default)]
    pub context: FxHashMap<String, Value>,
    /// When the page was last (re)created.
    pub updated_at: DateTime<Utc>,
    /// Node id of the plugin that created the page.
    #[serde(default)]
    pub plugin_creator_id: NodeId,
    /// Duplicate of `component` kept for template bookkeeping.
    pub component_path: PathBuf,
}

impl Page {
    /// Creates a page for `path` rendered by `component`, stamping the
    /// creation time and deriving the internal component and chunk names.
    pub fn new(path: impl Into<String>, component: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let component = component.into();
        Self {
            internal_component_name: internal_component_name_for(&path),
            component_chunk_name: component_chunk_name_for(&component),
            path,
            match_path: None,
            component_path: component.clone(),
            component,
            is_stateful: false,
            context: FxHashMap::default(),
            updated_at: Utc::now(),
            plugin_creator_id: NodeId::new(),
        }
    }

    /// Adds one entry to the page context.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Sets the client-side match pattern.
    #[must_use]
    pub fn with_match_path(mut self, match_path: impl Into<String>) -> Self {
        self.match_path = Some(match_path.into());
        self
    }

    /// Marks the page as created by the stateful page hook.
    #[must_use]
    pub fn stateful(mut self) -> Self {
        self.is_stateful = true;
        self
    }

    /// Records which plugin created the page.
    #[must_use]
    pub fn created_by(mut self, plugin_node_id: impl Into<NodeId>) -> Self {
        self.plugin_creator_id = plugin_node_id.into();
        self
    }
}

/// Derives the synthetic component name for a page path.
///
/// `/` maps to `ComponentIndex`; any other path becomes `Component` plus
/// the pascal-cased path segments (`/blog/hello/` -> `ComponentBlogHello`).
fn internal_component_name_for(path: &str) -> String {
    if path == "/" {
        return "ComponentIndex".to_string();
    }
    let mut name = String::from("Component");
    let mut upper_next = true;
    for ch in path.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next {
                name.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                name.push(ch);
            }
        } else {
            upper_next = true;
        }
    }
    name
}

/// Derives the bundler chunk name for a template component path.
///
/// Non-alphanumeric runs collapse to single dashes, so
/// `/site/src/templates/post.js` -> `component---site-src-templates-post-js`.
fn component_chunk_name_for(component: &Path) -> String {
    let raw = component.to_string_lossy();
    let mut name = String::from("component--");
    let mut dash_pending = true;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if dash_pending {
                name.push('-');
                dash_pending = false;
            }
            name.extend(ch.to_lowercase());
        } else {
            dash_pending = true;
        }
    }
    name
}

/// A server or client redirect from one path to another.
///
/// Hosting adapters accept arbitrary extra options on redirects, so unknown
/// keys are preserved in `extras`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Redirect {
    pub from_path: String,
    pub to_path: String,
    /// Emit a 301 instead of a 302.
    #[serde(default)]
    pub is_permanent: bool,
    /// Also register the redirect in the client-side router.
    #[serde(default)]
    pub redirect_in_browser: bool,
    /// Adapter-specific options, preserved verbatim.
    #[serde(flatten)]
    pub extras: FxHashMap<String, Value>,
}

impl Redirect {
    /// Creates a temporary (302) redirect.
    pub fn new(from_path: impl Into<String>, to_path: impl Into<String>) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: to_path.into(),
            is_permanent: false,
            redirect_in_browser: false,
            extras: FxHashMap::default(),
        }
    }

    /// Upgrades the redirect to a permanent (301) one.
    #[must_use]
    pub fn with_permanent(mut self) -> Self {
        self.is_permanent = true;
        self
    }

    /// Registers the redirect with the client-side router as well.
    #[must_use]
    pub fn with_browser_redirect(mut self) -> Self {
        self.redirect_in_browser = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_names_index_component() {
        let page = Page::new("/", "/site/src/pages/index.js");
        assert_eq!(page.internal_component_name, "ComponentIndex");
    }

    #[test]
    fn test_component_names_derived_from_path() {
        let page = Page::new("/blog/2024/hello-world/", "/site/src/templates/post.js");
        assert_eq!(page.internal_component_name, "ComponentBlog2024HelloWorld");
        assert_eq!(
            page.component_chunk_name,
            "component---site-src-templates-post-js"
        );
    }

    #[test]
    fn test_redirect_builders() {
        let redirect = Redirect::new("/old/", "/new/").with_permanent();
        assert!(redirect.is_permanent);
        assert!(!redirect.redirect_in_browser);
    }
}
