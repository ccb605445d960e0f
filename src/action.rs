//! The closed vocabulary of state-transition messages.
//!
//! Every mutation of [`crate::state::BuildState`] is described by one
//! [`Action`]: a tagged message carrying the data of the transition plus
//! optional attribution (which plugin asked for it, under which trace).
//! The build engine interprets actions into state changes; this crate owns
//! only the vocabulary, so the set is closed and deserializing an unknown
//! tag is an error.
//!
//! On the wire an action is a JSON object tagged by `type`, with the
//! transition data under `payload` and attribution fields alongside:
//!
//! ```json
//! { "type": "CREATE_PAGE", "payload": { ... }, "plugin": { ... } }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use siteloom_store::action::{Action, ActionKind};
//! use siteloom_store::node::ContentNode;
//!
//! let node = ContentNode::builder("post-1", "MarkdownPost").build().unwrap();
//! let action = Action::create_node(node);
//!
//! assert_eq!(action.kind(), ActionKind::CreateNode);
//! assert_eq!(action.kind().as_str(), "CREATE_NODE");
//!
//! let json = serde_json::to_value(&action).unwrap();
//! assert_eq!(json["type"], "CREATE_NODE");
//! assert_eq!(json["payload"]["id"], "post-1");
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::bundler::TransformOptionMap;
use crate::config::SiteConfig;
use crate::jobs::{InternalJob, JobResult, LegacyJob};
use crate::node::ContentNode;
use crate::page::{Page, Redirect};
use crate::plugin::PluginRef;
use crate::query::StaticQueryComponent;
use crate::schema::{CompiledSchema, FieldExtension, PrintSchemaRequest, TypeDefinitions};
use crate::types::{BuildStage, ContentDigest, NodeId, ProgramStatus};

// ============================================================================
// The Action Union
// ============================================================================

/// A single state-transition message.
///
/// Variants are grouped by the state slice they touch. The serialized tag
/// is the SCREAMING_SNAKE_CASE form of the variant name; [`ActionKind`]
/// gives the payload-free view of the same set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // ---- Nodes ----
    /// A source plugin created (or re-created) a content node.
    CreateNode { payload: ContentNode },
    /// A plugin attached a field to an existing node; the payload is the
    /// updated node.
    AddFieldToNode { payload: ContentNode },
    /// A transformer linked a derived child node; the payload is the
    /// updated parent.
    AddChildNodeToParentNode { payload: ContentNode },
    /// A node was deleted by id.
    DeleteNode { payload: IdPayload },
    /// A batch of nodes was deleted.
    DeleteNodes { payload: Vec<NodeId> },

    // ---- Pages and redirects ----
    /// A page was registered.
    CreatePage {
        payload: Page,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<PluginRef>,
        /// The page already existed and only its context changed, so its
        /// query must re-run even though the node data did not move.
        #[serde(default)]
        context_modified: bool,
    },
    /// A page was removed; the payload is the page as it was registered.
    DeletePage { payload: Page },
    /// A redirect was registered.
    CreateRedirect { payload: Redirect },

    // ---- Queries and dependencies ----
    /// A page query read a node or listed a connection.
    CreateComponentDependency {
        /// Name of the requesting plugin, when one was involved.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<String>,
        payload: ComponentDependencyPayload,
    },
    /// The given pages' query dependencies must be forgotten before their
    /// queries re-run.
    DeleteComponentsDependencies { payload: PathsPayload },
    /// The stored query text of a template was replaced.
    ReplaceComponentQuery { payload: ComponentQueryPayload },
    /// A static query was registered or its text replaced.
    ReplaceStaticQuery {
        payload: StaticQueryComponent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<PluginRef>,
    },
    /// A static query was removed; the payload is its id.
    RemoveStaticQuery { payload: String },
    /// A template component left the project.
    RemoveTemplateComponent { payload: ComponentPathPayload },
    /// Query extraction pulled a query out of a template.
    QueryExtracted {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: QueryExtractedPayload,
    },
    /// A template parsed cleanly during query extraction.
    QueryExtractionParseSuccess {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: ComponentPathPayload,
    },
    /// A template could not be parsed during query extraction.
    QueryExtractionParseError {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: QueryErrorPayload,
    },
    /// An extracted query was rejected by the schema.
    QueryExtractionQueryError {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: QueryErrorPayload,
    },
    /// A page or static query finished running.
    PageQueryRun {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: PageQueryRunPayload,
    },

    // ---- Schema ----
    /// The compiled schema was (re)built.
    SetSchema { payload: CompiledSchema },
    /// A plugin contributed an externally compiled schema.
    AddThirdPartySchema {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: CompiledSchema,
    },
    /// A plugin contributed SDL type definitions.
    CreateTypes {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: Vec<TypeDefinitions>,
    },
    /// A plugin registered a field extension.
    CreateFieldExtension {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: FieldExtension,
    },
    /// Printing the schema to disk was requested.
    PrintSchemaRequested {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: PrintSchemaRequest,
    },
    /// A plugin contributed resolver-context entries.
    CreateResolverContext {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: FxHashMap<String, Value>,
    },

    // ---- Program, config, and plugins ----
    /// The site configuration was loaded or reloaded.
    SetSiteConfig { payload: SiteConfig },
    /// The program reached a bootstrap milestone.
    SetProgramStatus {
        plugin: PluginRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: ProgramStatus,
    },
    /// A plugin replaced its own status map.
    SetPluginStatus {
        plugin: PluginRef,
        payload: FxHashMap<String, Value>,
    },
    /// The digest of the resolved-plugin list changed.
    UpdatePluginsHash { payload: ContentDigest },
    /// Theme resolution finished; the payload is the resolved theme list.
    SetResolvedThemes { payload: Value },

    // ---- Bundler and transforms ----
    /// A plugin merged a partial bundler configuration.
    SetBundlerConfig { payload: Value },
    /// The bundler configuration was replaced wholesale.
    ReplaceBundlerConfig { payload: Value },
    /// A bundler compilation finished with the given output hash.
    SetCompilationHash { payload: ContentDigest },
    /// A transform plugin was set for a stage.
    SetTransformPlugin { payload: TransformSetting },
    /// A transform preset was set for a stage.
    SetTransformPreset { payload: TransformSetting },
    /// Stage-level transform options were merged.
    SetTransformOptions { payload: TransformSetting },

    // ---- Jobs ----
    /// A digest-keyed job was submitted.
    CreateJobV2 { payload: JobV2Payload },
    /// A digest-keyed job finished with a result.
    EndJobV2 { payload: SettleJobPayload },
    /// A finished job's inputs disappeared; its entry must be dropped.
    RemoveStaleJobV2 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plugin: Option<PluginRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        payload: StaleJobPayload,
    },
    /// A legacy job was created.
    CreateJob {
        payload: LegacyJobPayload,
        plugin: PluginRef,
    },
    /// A legacy job was updated in place.
    SetJob {
        payload: LegacyJobPayload,
        plugin: PluginRef,
    },
    /// A legacy job finished.
    EndJob {
        payload: LegacyJobPayload,
        plugin: PluginRef,
    },

    // ---- Page data ----
    /// A page's query result hash was recorded.
    SetPageData { payload: PageDataPayload },
    /// A page's query result record was dropped.
    RemovePageData { payload: IdPayload },
    /// A page-data file was written with the given size.
    AddPageDataStats { payload: PageDataStatsPayload },

    // ---- Cache ----
    /// The persisted cache must be discarded entirely.
    DeleteCache,
}

// ============================================================================
// Payload Types
// ============================================================================

/// Payload carrying a bare identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPayload {
    pub id: NodeId,
}

/// One recorded query dependency: the page at `path` read `node_id`, or
/// listed the connection `connection`. Exactly one of the two is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDependencyPayload {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
}

/// A batch of page paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsPayload {
    pub paths: Vec<String>,
}

/// Replacement query text for a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentQueryPayload {
    pub query: String,
    pub component_path: PathBuf,
}

/// Payload identifying a template component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPathPayload {
    pub component_path: PathBuf,
}

/// A query pulled out of a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExtractedPayload {
    pub component_path: PathBuf,
    pub query: String,
}

/// A query-extraction failure for a template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryErrorPayload {
    pub component_path: PathBuf,
    pub error: String,
}

/// A finished query run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQueryRunPayload {
    /// Page path, or static-query id for static queries.
    pub path: String,
    pub component_path: PathBuf,
    /// `true` for a page query, `false` for a static query.
    pub is_page: bool,
}

/// Per-stage transform setting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformSetting {
    pub stage: BuildStage,
    /// Plugin or preset name; absent for stage-level option merges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub options: TransformOptionMap,
}

/// A submitted digest-keyed job with its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobV2Payload {
    pub job: InternalJob,
    pub plugin: PluginRef,
}

/// Completion record for a digest-keyed job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettleJobPayload {
    pub job_content_digest: ContentDigest,
    #[serde(default)]
    pub result: JobResult,
}

/// Identifies a job entry by its identity digest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleJobPayload {
    pub content_digest: ContentDigest,
}

/// A legacy job with its id alongside, as the old API shipped it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyJobPayload {
    pub id: String,
    pub job: LegacyJob,
}

/// Query result hash of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDataPayload {
    pub id: NodeId,
    pub result_hash: String,
}

/// Size of a written page-data file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDataStatsPayload {
    pub file_path: PathBuf,
    pub size: u64,
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Action {
    /// Wraps a node in a `CREATE_NODE` message.
    pub fn create_node(node: ContentNode) -> Self {
        Action::CreateNode { payload: node }
    }

    /// Deletes a node by id.
    pub fn delete_node(id: impl Into<NodeId>) -> Self {
        Action::DeleteNode {
            payload: IdPayload { id: id.into() },
        }
    }

    /// Registers a page without plugin attribution.
    pub fn create_page(page: Page) -> Self {
        Action::CreatePage {
            payload: page,
            plugin: None,
            context_modified: false,
        }
    }

    /// Removes a page.
    pub fn delete_page(page: Page) -> Self {
        Action::DeletePage { payload: page }
    }

    /// Registers a redirect.
    pub fn create_redirect(redirect: Redirect) -> Self {
        Action::CreateRedirect { payload: redirect }
    }

    /// Records a bootstrap milestone on behalf of `plugin`.
    pub fn set_program_status(status: ProgramStatus, plugin: PluginRef) -> Self {
        Action::SetProgramStatus {
            plugin,
            trace_id: None,
            payload: status,
        }
    }

    /// Submits a digest-keyed job.
    pub fn create_job_v2(job: InternalJob, plugin: PluginRef) -> Self {
        Action::CreateJobV2 {
            payload: JobV2Payload { job, plugin },
        }
    }

    /// Settles a digest-keyed job with its result.
    pub fn end_job_v2(job_content_digest: impl Into<ContentDigest>, result: JobResult) -> Self {
        Action::EndJobV2 {
            payload: SettleJobPayload {
                job_content_digest: job_content_digest.into(),
                result,
            },
        }
    }
}

// ============================================================================
// Uniform Accessors
// ============================================================================

impl Action {
    /// The payload-free discriminant of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateNode { .. } => ActionKind::CreateNode,
            Action::AddFieldToNode { .. } => ActionKind::AddFieldToNode,
            Action::AddChildNodeToParentNode { .. } => ActionKind::AddChildNodeToParentNode,
            Action::DeleteNode { .. } => ActionKind::DeleteNode,
            Action::DeleteNodes { .. } => ActionKind::DeleteNodes,
            Action::CreatePage { .. } => ActionKind::CreatePage,
            Action::DeletePage { .. } => ActionKind::DeletePage,
            Action::CreateRedirect { .. } => ActionKind::CreateRedirect,
            Action::CreateComponentDependency { .. } => ActionKind::CreateComponentDependency,
            Action::DeleteComponentsDependencies { .. } => {
                ActionKind::DeleteComponentsDependencies
            }
            Action::ReplaceComponentQuery { .. } => ActionKind::ReplaceComponentQuery,
            Action::ReplaceStaticQuery { .. } => ActionKind::ReplaceStaticQuery,
            Action::RemoveStaticQuery { .. } => ActionKind::RemoveStaticQuery,
            Action::RemoveTemplateComponent { .. } => ActionKind::RemoveTemplateComponent,
            Action::QueryExtracted { .. } => ActionKind::QueryExtracted,
            Action::QueryExtractionParseSuccess { .. } => ActionKind::QueryExtractionParseSuccess,
            Action::QueryExtractionParseError { .. } => ActionKind::QueryExtractionParseError,
            Action::QueryExtractionQueryError { .. } => ActionKind::QueryExtractionQueryError,
            Action::PageQueryRun { .. } => ActionKind::PageQueryRun,
            Action::SetSchema { .. } => ActionKind::SetSchema,
            Action::AddThirdPartySchema { .. } => ActionKind::AddThirdPartySchema,
            Action::CreateTypes { .. } => ActionKind::CreateTypes,
            Action::CreateFieldExtension { .. } => ActionKind::CreateFieldExtension,
            Action::PrintSchemaRequested { .. } => ActionKind::PrintSchemaRequested,
            Action::CreateResolverContext { .. } => ActionKind::CreateResolverContext,
            Action::SetSiteConfig { .. } => ActionKind::SetSiteConfig,
            Action::SetProgramStatus { .. } => ActionKind::SetProgramStatus,
            Action::SetPluginStatus { .. } => ActionKind::SetPluginStatus,
            Action::UpdatePluginsHash { .. } => ActionKind::UpdatePluginsHash,
            Action::SetResolvedThemes { .. } => ActionKind::SetResolvedThemes,
            Action::SetBundlerConfig { .. } => ActionKind::SetBundlerConfig,
            Action::ReplaceBundlerConfig { .. } => ActionKind::ReplaceBundlerConfig,
            Action::SetCompilationHash { .. } => ActionKind::SetCompilationHash,
            Action::SetTransformPlugin { .. } => ActionKind::SetTransformPlugin,
            Action::SetTransformPreset { .. } => ActionKind::SetTransformPreset,
            Action::SetTransformOptions { .. } => ActionKind::SetTransformOptions,
            Action::CreateJobV2 { .. } => ActionKind::CreateJobV2,
            Action::EndJobV2 { .. } => ActionKind::EndJobV2,
            Action::RemoveStaleJobV2 { .. } => ActionKind::RemoveStaleJobV2,
            Action::CreateJob { .. } => ActionKind::CreateJob,
            Action::SetJob { .. } => ActionKind::SetJob,
            Action::EndJob { .. } => ActionKind::EndJob,
            Action::SetPageData { .. } => ActionKind::SetPageData,
            Action::RemovePageData { .. } => ActionKind::RemovePageData,
            Action::AddPageDataStats { .. } => ActionKind::AddPageDataStats,
            Action::DeleteCache => ActionKind::DeleteCache,
        }
    }

    /// The plugin this action is attributed to, when one is recorded.
    ///
    /// `CREATE_COMPONENT_DEPENDENCY` carries only a plugin name and
    /// therefore answers `None` here.
    #[must_use]
    pub fn plugin(&self) -> Option<&PluginRef> {
        match self {
            Action::CreatePage { plugin, .. } => plugin.as_ref(),
            Action::ReplaceStaticQuery { plugin, .. } => plugin.as_ref(),
            Action::QueryExtracted { plugin, .. }
            | Action::QueryExtractionParseSuccess { plugin, .. }
            | Action::QueryExtractionParseError { plugin, .. }
            | Action::QueryExtractionQueryError { plugin, .. }
            | Action::PageQueryRun { plugin, .. }
            | Action::AddThirdPartySchema { plugin, .. }
            | Action::CreateTypes { plugin, .. }
            | Action::CreateFieldExtension { plugin, .. }
            | Action::PrintSchemaRequested { plugin, .. }
            | Action::CreateResolverContext { plugin, .. }
            | Action::SetProgramStatus { plugin, .. }
            | Action::SetPluginStatus { plugin, .. }
            | Action::CreateJob { plugin, .. }
            | Action::SetJob { plugin, .. }
            | Action::EndJob { plugin, .. } => Some(plugin),
            Action::CreateJobV2 { payload } => Some(&payload.plugin),
            Action::RemoveStaleJobV2 { plugin, .. } => plugin.as_ref(),
            _ => None,
        }
    }

    /// The trace id attribution, when one is recorded.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        match self {
            Action::QueryExtracted { trace_id, .. }
            | Action::QueryExtractionParseSuccess { trace_id, .. }
            | Action::QueryExtractionParseError { trace_id, .. }
            | Action::QueryExtractionQueryError { trace_id, .. }
            | Action::PageQueryRun { trace_id, .. }
            | Action::AddThirdPartySchema { trace_id, .. }
            | Action::CreateTypes { trace_id, .. }
            | Action::CreateFieldExtension { trace_id, .. }
            | Action::PrintSchemaRequested { trace_id, .. }
            | Action::CreateResolverContext { trace_id, .. }
            | Action::SetProgramStatus { trace_id, .. }
            | Action::RemoveStaleJobV2 { trace_id, .. } => trace_id.as_deref(),
            _ => None,
        }
    }
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.kind().as_str();
        match self {
            Action::CreateNode { payload }
            | Action::AddFieldToNode { payload }
            | Action::AddChildNodeToParentNode { payload } => {
                write!(f, "{tag} {} ({})", payload.id, payload.type_name())
            }
            Action::DeleteNode { payload } => write!(f, "{tag} {}", payload.id),
            Action::DeleteNodes { payload } => write!(f, "{tag} ({} nodes)", payload.len()),
            Action::CreatePage { payload, .. } | Action::DeletePage { payload } => {
                write!(f, "{tag} {}", payload.path)
            }
            Action::CreateRedirect { payload } => {
                write!(f, "{tag} {} -> {}", payload.from_path, payload.to_path)
            }
            Action::CreateComponentDependency { payload, .. } => {
                write!(f, "{tag} {}", payload.path)
            }
            Action::DeleteComponentsDependencies { payload } => {
                write!(f, "{tag} ({} paths)", payload.paths.len())
            }
            Action::ReplaceComponentQuery { payload } => {
                write!(f, "{tag} {}", payload.component_path.display())
            }
            Action::ReplaceStaticQuery { payload, .. } => write!(f, "{tag} {}", payload.id),
            Action::RemoveStaticQuery { payload } => write!(f, "{tag} {payload}"),
            Action::RemoveTemplateComponent { payload }
            | Action::QueryExtractionParseSuccess { payload, .. } => {
                write!(f, "{tag} {}", payload.component_path.display())
            }
            Action::QueryExtracted { payload, .. } => {
                write!(f, "{tag} {}", payload.component_path.display())
            }
            Action::QueryExtractionParseError { payload, .. }
            | Action::QueryExtractionQueryError { payload, .. } => {
                write!(f, "{tag} {}: {}", payload.component_path.display(), payload.error)
            }
            Action::PageQueryRun { payload, .. } => write!(f, "{tag} {}", payload.path),
            Action::SetSchema { payload } => {
                write!(f, "{tag} ({} types)", payload.type_names.len())
            }
            Action::AddThirdPartySchema { payload, .. } => {
                write!(f, "{tag} ({} types)", payload.type_names.len())
            }
            Action::CreateTypes { payload, .. } => {
                write!(f, "{tag} ({} definitions)", payload.len())
            }
            Action::CreateFieldExtension { payload, .. } => write!(f, "{tag} {}", payload.name),
            Action::PrintSchemaRequested { payload, .. } => match &payload.path {
                Some(path) => write!(f, "{tag} {}", path.display()),
                None => write!(f, "{tag}"),
            },
            Action::CreateResolverContext { payload, .. } => {
                write!(f, "{tag} ({} entries)", payload.len())
            }
            Action::SetSiteConfig { payload } => {
                write!(f, "{tag} ({} plugins)", payload.plugins.len())
            }
            Action::SetProgramStatus { payload, .. } => write!(f, "{tag} {payload}"),
            Action::SetPluginStatus { plugin, .. } => write!(f, "{tag} {}", plugin.name),
            Action::UpdatePluginsHash { payload } => {
                write!(f, "{tag} {}", short_digest(payload))
            }
            Action::SetCompilationHash { payload } => {
                write!(f, "{tag} {}", short_digest(payload))
            }
            Action::SetTransformPlugin { payload }
            | Action::SetTransformPreset { payload }
            | Action::SetTransformOptions { payload } => match &payload.name {
                Some(name) => write!(f, "{tag} {} ({name})", payload.stage),
                None => write!(f, "{tag} {}", payload.stage),
            },
            Action::CreateJobV2 { payload } => write!(f, "{tag} {}", payload.job.name),
            Action::EndJobV2 { payload } => {
                write!(f, "{tag} {}", short_digest(&payload.job_content_digest))
            }
            Action::RemoveStaleJobV2 { payload, .. } => {
                write!(f, "{tag} {}", short_digest(&payload.content_digest))
            }
            Action::CreateJob { payload, .. }
            | Action::SetJob { payload, .. }
            | Action::EndJob { payload, .. } => write!(f, "{tag} {}", payload.id),
            Action::SetPageData { payload } => write!(f, "{tag} {}", payload.id),
            Action::RemovePageData { payload } => write!(f, "{tag} {}", payload.id),
            Action::AddPageDataStats { payload } => {
                write!(f, "{tag} {}", payload.file_path.display())
            }
            Action::SetResolvedThemes { .. }
            | Action::SetBundlerConfig { .. }
            | Action::ReplaceBundlerConfig { .. }
            | Action::DeleteCache => write!(f, "{tag}"),
        }
    }
}

// ============================================================================
// ActionKind
// ============================================================================

/// Payload-free discriminant of [`Action`].
///
/// Useful for dispatch tables, filtering, and logging. The wire tag of
/// every kind is available through [`as_str`](Self::as_str), and kinds
/// parse back from the tag via [`FromStr`].
///
/// # Examples
///
/// ```rust
/// use siteloom_store::action::ActionKind;
///
/// assert_eq!(ActionKind::CreateJobV2.as_str(), "CREATE_JOB_V2");
/// let kind: ActionKind = "DELETE_CACHE".parse().unwrap();
/// assert_eq!(kind, ActionKind::DeleteCache);
/// assert!("BUMP_VERSION".parse::<ActionKind>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateNode,
    AddFieldToNode,
    AddChildNodeToParentNode,
    DeleteNode,
    DeleteNodes,
    CreatePage,
    DeletePage,
    CreateRedirect,
    CreateComponentDependency,
    DeleteComponentsDependencies,
    ReplaceComponentQuery,
    ReplaceStaticQuery,
    RemoveStaticQuery,
    RemoveTemplateComponent,
    QueryExtracted,
    QueryExtractionParseSuccess,
    QueryExtractionParseError,
    QueryExtractionQueryError,
    PageQueryRun,
    SetSchema,
    AddThirdPartySchema,
    CreateTypes,
    CreateFieldExtension,
    PrintSchemaRequested,
    CreateResolverContext,
    SetSiteConfig,
    SetProgramStatus,
    SetPluginStatus,
    UpdatePluginsHash,
    SetResolvedThemes,
    SetBundlerConfig,
    ReplaceBundlerConfig,
    SetCompilationHash,
    SetTransformPlugin,
    SetTransformPreset,
    SetTransformOptions,
    CreateJobV2,
    EndJobV2,
    RemoveStaleJobV2,
    CreateJob,
    SetJob,
    EndJob,
    SetPageData,
    RemovePageData,
    AddPageDataStats,
    DeleteCache,
}

impl ActionKind {
    /// Every kind, grouped the way the `Action` variants are declared.
    pub const ALL: [ActionKind; 46] = [
        ActionKind::CreateNode,
        ActionKind::AddFieldToNode,
        ActionKind::AddChildNodeToParentNode,
        ActionKind::DeleteNode,
        ActionKind::DeleteNodes,
        ActionKind::CreatePage,
        ActionKind::DeletePage,
        ActionKind::CreateRedirect,
        ActionKind::CreateComponentDependency,
        ActionKind::DeleteComponentsDependencies,
        ActionKind::ReplaceComponentQuery,
        ActionKind::ReplaceStaticQuery,
        ActionKind::RemoveStaticQuery,
        ActionKind::RemoveTemplateComponent,
        ActionKind::QueryExtracted,
        ActionKind::QueryExtractionParseSuccess,
        ActionKind::QueryExtractionParseError,
        ActionKind::QueryExtractionQueryError,
        ActionKind::PageQueryRun,
        ActionKind::SetSchema,
        ActionKind::AddThirdPartySchema,
        ActionKind::CreateTypes,
        ActionKind::CreateFieldExtension,
        ActionKind::PrintSchemaRequested,
        ActionKind::CreateResolverContext,
        ActionKind::SetSiteConfig,
        ActionKind::SetProgramStatus,
        ActionKind::SetPluginStatus,
        ActionKind::UpdatePluginsHash,
        ActionKind::SetResolvedThemes,
        ActionKind::SetBundlerConfig,
        ActionKind::ReplaceBundlerConfig,
        ActionKind::SetCompilationHash,
        ActionKind::SetTransformPlugin,
        ActionKind::SetTransformPreset,
        ActionKind::SetTransformOptions,
        ActionKind::CreateJobV2,
        ActionKind::EndJobV2,
        ActionKind::RemoveStaleJobV2,
        ActionKind::CreateJob,
        ActionKind::SetJob,
        ActionKind::EndJob,
        ActionKind::SetPageData,
        ActionKind::RemovePageData,
        ActionKind::AddPageDataStats,
        ActionKind::DeleteCache,
    ];

    /// The stable wire tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateNode => "CREATE_NODE",
            ActionKind::AddFieldToNode => "ADD_FIELD_TO_NODE",
            ActionKind::AddChildNodeToParentNode => "ADD_CHILD_NODE_TO_PARENT_NODE",
            ActionKind::DeleteNode => "DELETE_NODE",
            ActionKind::DeleteNodes => "DELETE_NODES",
            ActionKind::CreatePage => "CREATE_PAGE",
            ActionKind::DeletePage => "DELETE_PAGE",
            ActionKind::CreateRedirect => "CREATE_REDIRECT",
            ActionKind::CreateComponentDependency => "CREATE_COMPONENT_DEPENDENCY",
            ActionKind::DeleteComponentsDependencies => "DELETE_COMPONENTS_DEPENDENCIES",
            ActionKind::ReplaceComponentQuery => "REPLACE_COMPONENT_QUERY",
            ActionKind::ReplaceStaticQuery => "REPLACE_STATIC_QUERY",
            ActionKind::RemoveStaticQuery => "REMOVE_STATIC_QUERY",
            ActionKind::RemoveTemplateComponent => "REMOVE_TEMPLATE_COMPONENT",
            ActionKind::QueryExtracted => "QUERY_EXTRACTED",
            ActionKind::QueryExtractionParseSuccess => "QUERY_EXTRACTION_PARSE_SUCCESS",
            ActionKind::QueryExtractionParseError => "QUERY_EXTRACTION_PARSE_ERROR",
            ActionKind::QueryExtractionQueryError => "QUERY_EXTRACTION_QUERY_ERROR",
            ActionKind::PageQueryRun => "PAGE_QUERY_RUN",
            ActionKind::SetSchema => "SET_SCHEMA",
            ActionKind::AddThirdPartySchema => "ADD_THIRD_PARTY_SCHEMA",
            ActionKind::CreateTypes => "CREATE_TYPES",
            ActionKind::CreateFieldExtension => "CREATE_FIELD_EXTENSION",
            ActionKind::PrintSchemaRequested => "PRINT_SCHEMA_REQUESTED",
            ActionKind::CreateResolverContext => "CREATE_RESOLVER_CONTEXT",
            ActionKind::SetSiteConfig => "SET_SITE_CONFIG",
            ActionKind::SetProgramStatus => "SET_PROGRAM_STATUS",
            ActionKind::SetPluginStatus => "SET_PLUGIN_STATUS",
            ActionKind::UpdatePluginsHash => "UPDATE_PLUGINS_HASH",
            ActionKind::SetResolvedThemes => "SET_RESOLVED_THEMES",
            ActionKind::SetBundlerConfig => "SET_BUNDLER_CONFIG",
            ActionKind::ReplaceBundlerConfig => "REPLACE_BUNDLER_CONFIG",
            ActionKind::SetCompilationHash => "SET_COMPILATION_HASH",
            ActionKind::SetTransformPlugin => "SET_TRANSFORM_PLUGIN",
            ActionKind::SetTransformPreset => "SET_TRANSFORM_PRESET",
            ActionKind::SetTransformOptions => "SET_TRANSFORM_OPTIONS",
            ActionKind::CreateJobV2 => "CREATE_JOB_V2",
            ActionKind::EndJobV2 => "END_JOB_V2",
            ActionKind::RemoveStaleJobV2 => "REMOVE_STALE_JOB_V2",
            ActionKind::CreateJob => "CREATE_JOB",
            ActionKind::SetJob => "SET_JOB",
            ActionKind::EndJob => "END_JOB",
            ActionKind::SetPageData => "SET_PAGE_DATA",
            ActionKind::RemovePageData => "REMOVE_PAGE_DATA",
            ActionKind::AddPageDataStats => "ADD_PAGE_DATA_STATS",
            ActionKind::DeleteCache => "DELETE_CACHE",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown action tag.
#[derive(Debug, Error, Diagnostic)]
#[error("unknown action tag: {0}")]
#[diagnostic(
    code(siteloom::action::unknown_tag),
    help("The action vocabulary is closed; check the tag against ActionKind::ALL.")
)]
pub struct UnknownActionTag(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownActionTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_tag() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_delete_cache_is_bare() {
        let json = serde_json::to_value(&Action::DeleteCache).unwrap();
        assert_eq!(json, serde_json::json!({"type": "DELETE_CACHE"}));
    }

    #[test]
    fn test_plugin_accessor_reaches_into_job_payload() {
        let plugin = PluginRef::new("p1", "plugin-sharp", "4.0.0");
        let job = InternalJob {
            id: "j1".to_string(),
            name: "IMAGE_PROCESSING".to_string(),
            content_digest: "d".repeat(64),
            input_paths: vec![],
            output_dir: PathBuf::from("/out"),
            args: Value::Null,
            created_at: chrono::Utc::now(),
        };
        let action = Action::create_job_v2(job, plugin);
        assert_eq!(action.plugin().unwrap().name, "plugin-sharp");
    }
}
