//! Core types for the Siteloom build-state store.
//!
//! This module defines the small shared vocabulary used across the store:
//! identifier aliases, the coarse bootstrap status reported by the build
//! program, and the build stages that key per-stage transform options.
//! These are the domain concepts every other module speaks in.
//!
//! # Key Types
//!
//! - [`NodeId`] / [`ContentDigest`]: string aliases for stable identifiers
//! - [`ProgramStatus`]: coarse lifecycle markers emitted during bootstrap
//! - [`BuildStage`]: the four compilation stages of a site build
//! - [`Program`]: the CLI invocation record the state was created under
//!
//! # Examples
//!
//! ```rust
//! use siteloom_store::types::BuildStage;
//!
//! let stage = BuildStage::BuildHtml;
//! assert_eq!(stage.as_str(), "build-html");
//! assert_eq!("build-html".parse::<BuildStage>().unwrap(), stage);
//!
//! // All four stages, in build order
//! assert_eq!(BuildStage::ALL.len(), 4);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of a content node, chosen by the plugin that sourced it.
///
/// The store never mints node ids; it only indexes by them.
pub type NodeId = String;

/// Hex-encoded SHA-256 digest used for content identity (node contents,
/// job inputs, the plugins hash, page-data results).
pub type ContentDigest = String;

/// Coarse lifecycle markers the build program records as bootstrap
/// progresses.
///
/// The wire form is the historical SCREAMING_SNAKE_CASE tag, so snapshots
/// written by older builds keep loading.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::types::ProgramStatus;
///
/// let status = ProgramStatus::BootstrapFinished;
/// assert_eq!(status.as_str(), "BOOTSTRAP_FINISHED");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramStatus {
    /// Bootstrap completed; the develop server can start serving.
    BootstrapFinished,
    /// Bootstrap plus the initial query run completed.
    BootstrapQueryRunningFinished,
}

impl ProgramStatus {
    /// The stable wire tag for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::BootstrapFinished => "BOOTSTRAP_FINISHED",
            ProgramStatus::BootstrapQueryRunningFinished => "BOOTSTRAP_QUERY_RUNNING_FINISHED",
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four compilation stages of a site build.
///
/// Each stage carries its own script-transform configuration (see
/// [`crate::bundler::TransformStages`]); the stage name doubles as the
/// map key in serialized form.
///
/// # Examples
///
/// ```rust
/// use siteloom_store::types::BuildStage;
///
/// assert_eq!(BuildStage::Develop.as_str(), "develop");
/// assert_eq!(BuildStage::BuildJavascript.to_string(), "build-javascript");
///
/// let parsed: BuildStage = "develop-html".parse().unwrap();
/// assert_eq!(parsed, BuildStage::DevelopHtml);
/// assert!("release".parse::<BuildStage>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStage {
    /// Development server bundle.
    Develop,
    /// HTML renderer used by the development server.
    DevelopHtml,
    /// Static HTML rendering during a production build.
    BuildHtml,
    /// Client JavaScript bundle of a production build.
    BuildJavascript,
}

impl BuildStage {
    /// All stages, in the order the build pipeline runs them.
    pub const ALL: [BuildStage; 4] = [
        BuildStage::Develop,
        BuildStage::DevelopHtml,
        BuildStage::BuildHtml,
        BuildStage::BuildJavascript,
    ];

    /// The stable kebab-case stage name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStage::Develop => "develop",
            BuildStage::DevelopHtml => "develop-html",
            BuildStage::BuildHtml => "build-html",
            BuildStage::BuildJavascript => "build-javascript",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown stage name.
#[derive(Debug, Error, Diagnostic)]
#[error("unknown build stage: {0}")]
#[diagnostic(
    code(siteloom::types::unknown_stage),
    help("Valid stages are develop, develop-html, build-html, build-javascript.")
)]
pub struct UnknownStage(pub String);

impl FromStr for BuildStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "develop" => Ok(BuildStage::Develop),
            "develop-html" => Ok(BuildStage::DevelopHtml),
            "build-html" => Ok(BuildStage::BuildHtml),
            "build-javascript" => Ok(BuildStage::BuildJavascript),
            other => Err(UnknownStage(other.to_string())),
        }
    }
}

/// The CLI invocation the current state was created under.
///
/// The store keeps this as a plain record; interpreting the command is the
/// build engine's business.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Root directory of the site being built.
    pub directory: PathBuf,
    /// Command name as invoked (`develop`, `build`, `serve`, ...).
    pub command: String,
    /// Verbose output requested.
    #[serde(default)]
    pub verbose: bool,
    /// Host override for the develop server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Port override for the develop server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Source file extensions the build resolves, in priority order.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Program {
    /// Creates a program record for the given site directory and command.
    pub fn new(directory: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            command: command.into(),
            ..Default::default()
        }
    }
}
