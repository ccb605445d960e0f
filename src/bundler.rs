//! Bundler orchestration state: the merged bundler configuration and the
//! per-stage script-transform options.
//!
//! The store does not run the bundler. It holds the configuration object
//! plugins have assembled (an opaque JSON document) and the transform
//! plugin/preset lists for each [`BuildStage`], exactly as the engine needs
//! them when it hands off to the toolchain.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::BuildStage;

/// The assembled bundler configuration.
///
/// Opaque to the store; plugins contribute partial documents and the final
/// object is what the orchestration step consumes.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::bundler::BundlerConfig;
/// use serde_json::json;
///
/// let mut config = BundlerConfig::default();
/// config.replace(json!({"mode": "production", "plugins": ["a"]}));
/// config.merge_partial(&json!({"plugins": ["b"], "devtool": false}));
///
/// assert_eq!(config.value()["mode"], "production");
/// assert_eq!(config.value()["plugins"], json!(["a", "b"]));
/// assert_eq!(config.value()["devtool"], false);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundlerConfig(Value);

impl Default for BundlerConfig {
    fn default() -> Self {
        BundlerConfig(Value::Object(Map::new()))
    }
}

impl BundlerConfig {
    /// The current configuration document.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Replaces the configuration wholesale.
    pub fn replace(&mut self, config: Value) {
        self.0 = config;
    }

    /// Merges a partial configuration into the current one.
    ///
    /// Objects merge key by key, arrays concatenate, and on a scalar
    /// collision the incoming value wins. A non-object partial therefore
    /// replaces a non-object current value outright.
    pub fn merge_partial(&mut self, partial: &Value) {
        self.0 = merge_values(&self.0, partial);
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Recursive merge used by [`BundlerConfig::merge_partial`].
fn merge_values(current: &Value, incoming: &Value) -> Value {
    match (current, incoming) {
        (Value::Object(current_obj), Value::Object(incoming_obj)) => {
            let mut result = Map::new();
            for (key, value) in current_obj {
                if let Some(incoming_value) = incoming_obj.get(key) {
                    result.insert(key.clone(), merge_values(value, incoming_value));
                } else {
                    result.insert(key.clone(), value.clone());
                }
            }
            for (key, value) in incoming_obj {
                if !current_obj.contains_key(key) {
                    result.insert(key.clone(), value.clone());
                }
            }
            Value::Object(result)
        }
        (Value::Array(current_arr), Value::Array(incoming_arr)) => {
            let mut result = current_arr.clone();
            result.extend(incoming_arr.iter().cloned());
            Value::Array(result)
        }
        (_, incoming_value) => incoming_value.clone(),
    }
}

/// A named transform plugin or preset with its options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

impl PluginEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Null,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// Script-transform configuration for one build stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
    #[serde(default)]
    pub presets: Vec<PluginEntry>,
    #[serde(default)]
    pub options: StageOptions,
}

impl TransformOptions {
    /// Adds a transform plugin, replacing the options of an existing entry
    /// with the same name.
    pub fn upsert_plugin(&mut self, entry: PluginEntry) {
        upsert(&mut self.plugins, entry);
    }

    /// Adds a transform preset, replacing the options of an existing entry
    /// with the same name.
    pub fn upsert_preset(&mut self, entry: PluginEntry) {
        upsert(&mut self.presets, entry);
    }
}

fn upsert(entries: &mut Vec<PluginEntry>, entry: PluginEntry) {
    if let Some(existing) = entries.iter_mut().find(|e| e.name == entry.name) {
        *existing = entry;
    } else {
        entries.push(entry);
    }
}

/// Stage-level transform options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOptions {
    /// Cache transform output on disk between runs.
    #[serde(default = "default_cache_directory")]
    pub cache_directory: bool,
    /// How ambiguous module syntax is parsed.
    #[serde(default = "default_source_type")]
    pub source_type: String,
    /// Source-map mode, when overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<String>,
}

fn default_cache_directory() -> bool {
    true
}

fn default_source_type() -> String {
    "unambiguous".to_string()
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            cache_directory: true,
            source_type: default_source_type(),
            source_maps: None,
        }
    }
}

/// Transform configuration for all four build stages.
///
/// Every stage is always present; `Default` yields the baseline
/// configuration each stage starts from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransformStages {
    pub develop: TransformOptions,
    pub develop_html: TransformOptions,
    pub build_html: TransformOptions,
    pub build_javascript: TransformOptions,
}

impl TransformStages {
    /// The transform options for `stage`.
    #[must_use]
    pub fn stage(&self, stage: BuildStage) -> &TransformOptions {
        match stage {
            BuildStage::Develop => &self.develop,
            BuildStage::DevelopHtml => &self.develop_html,
            BuildStage::BuildHtml => &self.build_html,
            BuildStage::BuildJavascript => &self.build_javascript,
        }
    }

    /// Mutable access to the transform options for `stage`.
    pub fn stage_mut(&mut self, stage: BuildStage) -> &mut TransformOptions {
        match stage {
            BuildStage::Develop => &mut self.develop,
            BuildStage::DevelopHtml => &mut self.develop_html,
            BuildStage::BuildHtml => &mut self.build_html,
            BuildStage::BuildJavascript => &mut self.build_javascript,
        }
    }

    /// Stage-by-stage iteration in build order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildStage, &TransformOptions)> {
        BuildStage::ALL.iter().map(move |stage| (*stage, self.stage(*stage)))
    }
}

/// Map form of a transform setting payload, used when a payload carries
/// free-form per-plugin options.
pub type TransformOptionMap = FxHashMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_prefers_incoming_scalars() {
        let mut config = BundlerConfig::default();
        config.replace(json!({"devtool": "source-map"}));
        config.merge_partial(&json!({"devtool": false}));
        assert_eq!(config.value()["devtool"], json!(false));
    }

    #[test]
    fn test_merge_recurses_into_objects() {
        let mut config = BundlerConfig::default();
        config.replace(json!({"resolve": {"alias": {"a": "1"}}}));
        config.merge_partial(&json!({"resolve": {"alias": {"b": "2"}}}));
        assert_eq!(
            config.value()["resolve"]["alias"],
            json!({"a": "1", "b": "2"})
        );
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut stage = TransformOptions::default();
        stage.upsert_plugin(PluginEntry::new("transform-runtime"));
        stage.upsert_plugin(
            PluginEntry::new("transform-runtime").with_options(json!({"corejs": 3})),
        );
        assert_eq!(stage.plugins.len(), 1);
        assert_eq!(stage.plugins[0].options, json!({"corejs": 3}));
    }

    #[test]
    fn test_all_stages_present_by_default() {
        let stages = TransformStages::default();
        assert_eq!(stages.iter().count(), 4);
        assert!(stages.stage(BuildStage::Develop).options.cache_directory);
    }
}
