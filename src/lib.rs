//! # Siteloom Store: Typed Build State for the Siteloom Site Compiler
//!
//! This crate is the state model of the Siteloom build engine: the shape of
//! global build state, the closed vocabulary of state-transition messages
//! ("actions") that describe mutations of it, and the snapshot persistence
//! for the subset of state that survives between builds.
//!
//! ## Core Concepts
//!
//! - **Nodes**: Content records sourced by plugins, indexed by id and type
//! - **Actions**: Tagged messages describing one state mutation each
//! - **State**: The [`state::BuildState`] aggregate the engine's reducer owns
//! - **Cache**: The [`state::CachedState`] projection persisted to disk
//! - **Jobs**: Digest-keyed work items whose results are reusable across builds
//!
//! The reducer that interprets actions lives in the build engine, not here;
//! this crate owns the vocabulary and the data, so the engine stays lean and
//! every collaborator (CLI, develop server, plugins) speaks the same types.
//!
//! ## Quick Start
//!
//! ### Sourcing a node and describing the mutation
//!
//! ```
//! use siteloom_store::action::Action;
//! use siteloom_store::node::ContentNode;
//! use serde_json::json;
//!
//! let node = ContentNode::builder("post-1", "MarkdownPost")
//!     .with_owner("source-filesystem")
//!     .with_field("slug", json!("/hello/"))
//!     .build()
//!     .unwrap();
//!
//! let action = Action::create_node(node);
//! assert_eq!(action.kind().as_str(), "CREATE_NODE");
//!
//! // Actions are plain data; the wire form is a type-tagged JSON object.
//! let wire = serde_json::to_value(&action).unwrap();
//! assert_eq!(wire["type"], "CREATE_NODE");
//! ```
//!
//! ### Holding state and keeping the node index consistent
//!
//! ```
//! use siteloom_store::node::ContentNode;
//! use siteloom_store::state::BuildState;
//!
//! let mut state = BuildState::default();
//! state.insert_node(ContentNode::builder("a", "Post").build().unwrap());
//! state.insert_node(ContentNode::builder("b", "Author").build().unwrap());
//!
//! assert_eq!(state.nodes_of_type("Post").count(), 1);
//! ```
//!
//! ### Persisting the cached subset
//!
//! ```rust,no_run
//! use siteloom_store::persist::{StoreConfig, save_snapshot, load_snapshot};
//! use siteloom_store::state::BuildState;
//!
//! # fn main() -> Result<(), siteloom_store::persist::PersistError> {
//! let config = StoreConfig::from_env();
//! let state = BuildState::default();
//!
//! save_snapshot(&config, &state.to_cached())?;
//! if let Some(envelope) = load_snapshot(&config)? {
//!     let warm = BuildState::from_cached(envelope.state);
//!     # let _ = warm;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`] - Identifier aliases, program record, build stages
//! - [`action`] - The tagged action union and its discriminants
//! - [`state`] - The build-state aggregate and its cached projection
//! - [`node`] - Content nodes and the node builder
//! - [`page`] - Page registry entries and redirects
//! - [`plugin`] - Plugin attribution records and resolved manifests
//! - [`config`] - The parsed site configuration shape
//! - [`schema`] - Compiled-schema handle and customization inputs
//! - [`query`] - Query bookkeeping and data dependencies
//! - [`jobs`] - Both generations of the job ledger
//! - [`bundler`] - Bundler config and per-stage transforms
//! - [`diagnostics`] - Reporter log ledger
//! - [`digest`] - SHA-256 content identity helpers
//! - [`persist`] - Snapshot save/load/delete

pub mod action;
pub mod bundler;
pub mod config;
pub mod diagnostics;
pub mod digest;
pub mod jobs;
pub mod node;
pub mod page;
pub mod persist;
pub mod plugin;
pub mod query;
pub mod schema;
pub mod state;
pub mod types;
