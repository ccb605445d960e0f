//! Data-layer schema state: the compiled schema handle and the accumulated
//! customization inputs that produce it.
//!
//! Schema composition itself happens outside this crate. The store holds
//! what plugins contributed (SDL sources, field extensions, resolver
//! context, third-party schemas) and the opaque result of compiling them.

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque handle to a compiled data-layer schema.
///
/// The store only needs identity and printability: the SDL text and the
/// names of the types it defines. The executable schema object stays with
/// the query engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledSchema {
    /// Printed schema definition language.
    pub sdl: String,
    /// Names of the types the schema defines.
    #[serde(default)]
    pub type_names: Vec<String>,
}

impl CompiledSchema {
    pub fn new(sdl: impl Into<String>, type_names: Vec<String>) -> Self {
        Self {
            sdl: sdl.into(),
            type_names,
        }
    }

    /// Returns `true` when no schema has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sdl.is_empty() && self.type_names.is_empty()
    }
}

/// SDL type definitions contributed by one plugin call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinitions {
    /// The SDL source text.
    pub source: String,
    /// Name of the contributing plugin, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl TypeDefinitions {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            owner: None,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// A named field extension registered by a plugin.
///
/// The definition payload (argument types, resolver wiring) is opaque here;
/// the schema compiler interprets it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldExtension {
    pub name: String,
    pub definition: Value,
}

/// Name filters for a schema print request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
}

/// Request to print the schema to disk for editor tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSchemaRequest {
    /// Output path; the engine default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<TypeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<TypeFilter>,
    /// Include field types in the printed output.
    #[serde(default = "default_true")]
    pub with_field_types: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PrintSchemaRequest {
    fn default() -> Self {
        Self {
            path: None,
            include: None,
            exclude: None,
            with_field_types: true,
        }
    }
}

/// Accumulated schema-customization inputs.
///
/// Plugins contribute to this slice during bootstrap; the schema compiler
/// consumes all of it in one pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaCustomization {
    /// Resolver-context entries contributed by plugins.
    #[serde(default)]
    pub context: FxHashMap<String, Value>,
    /// Registered field extensions, keyed by extension name.
    #[serde(default)]
    pub field_extensions: FxHashMap<String, FieldExtension>,
    /// Pending schema print request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_config: Option<PrintSchemaRequest>,
    /// Externally compiled schemas merged in wholesale.
    #[serde(default)]
    pub third_party_schemas: Vec<CompiledSchema>,
    /// SDL contributions, in registration order.
    #[serde(default)]
    pub types: Vec<TypeDefinitions>,
}

impl SchemaCustomization {
    /// Registers SDL type definitions.
    pub fn add_types(&mut self, definitions: TypeDefinitions) {
        self.types.push(definitions);
    }

    /// Registers a field extension; a later registration under the same
    /// name replaces the earlier one.
    pub fn add_field_extension(&mut self, extension: FieldExtension) {
        self.field_extensions
            .insert(extension.name.clone(), extension);
    }

    /// Merges resolver-context entries.
    pub fn extend_context(&mut self, context: FxHashMap<String, Value>) {
        self.context.extend(context);
    }
}

/// Progress of type inference over sourced nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceMetadata {
    /// Inference pipeline step the metadata was captured at.
    #[serde(default)]
    pub step: String,
    /// Per-type inference bookkeeping.
    #[serde(default)]
    pub type_map: FxHashMap<String, TypeInferenceMetadata>,
}

/// Inference bookkeeping for a single node type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeInferenceMetadata {
    /// Fields excluded from inference.
    #[serde(default)]
    pub ignored_fields: FxHashSet<String>,
    /// Number of nodes examined.
    #[serde(default)]
    pub total: u64,
    /// The type saw changes since the schema was last built.
    #[serde(default)]
    pub dirty: bool,
    /// Aggregated field shape descriptor, opaque to the store.
    #[serde(default)]
    pub field_map: Value,
}
