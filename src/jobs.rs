//! The job ledger: long-running work items plugins hand off to the engine.
//!
//! Two generations coexist. The current one keys jobs by a content digest
//! of everything that defines the work ([`InternalJob`], [`JobV2Ledger`]),
//! which is what makes finished jobs skippable across builds: same digest,
//! same output. The legacy one ([`LegacyJobLedger`]) tracked free-form job
//! objects by id and survives only because older plugins still emit it.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::digest::{DigestError, content_digest_of};
use crate::plugin::PluginRef;
use crate::types::ContentDigest;

// ============================================================================
// V2 Jobs (digest-keyed)
// ============================================================================

/// What a plugin submits when it wants work done.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Worker name (`IMAGE_PROCESSING`, ...).
    pub name: String,
    /// Files the job reads.
    pub input_paths: Vec<PathBuf>,
    /// Directory the job writes results into.
    pub output_dir: PathBuf,
    /// Worker-specific arguments.
    #[serde(default)]
    pub args: Value,
}

/// One input file of a job, pinned by content digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub path: PathBuf,
    pub content_digest: ContentDigest,
}

/// A job request the engine has taken ownership of.
///
/// Carries the derived identity digest: two jobs with the same worker,
/// plugin, input contents, and arguments get the same digest no matter the
/// order the inputs were listed in, so a finished result can be reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InternalJob {
    /// Unique id of this submission.
    pub id: String,
    /// Worker name.
    pub name: String,
    /// Identity digest; key of the ledger maps.
    pub content_digest: ContentDigest,
    /// Inputs with their content digests, sorted by path.
    pub input_paths: Vec<JobInput>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub args: Value,
    pub created_at: DateTime<Utc>,
}

impl InternalJob {
    /// Converts a request into an owned job.
    ///
    /// `resolve_input_digest` supplies the content digest of each input
    /// file; keeping the file read outside the store lets callers digest
    /// from a virtual file system or a warm cache.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use siteloom_store::jobs::{InternalJob, JobRequest};
    /// use siteloom_store::plugin::PluginRef;
    /// use siteloom_store::digest::content_digest_of_bytes;
    /// use serde_json::json;
    ///
    /// let request = JobRequest {
    ///     name: "IMAGE_PROCESSING".to_string(),
    ///     input_paths: vec!["/site/src/images/hero.jpg".into()],
    ///     output_dir: "/site/public/static".into(),
    ///     args: json!({"width": 800}),
    /// };
    /// let plugin = PluginRef::new("p1", "plugin-sharp", "4.0.0");
    ///
    /// let job = InternalJob::from_request(request, &plugin, |_path| {
    ///     Ok(content_digest_of_bytes(b"fake image bytes"))
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(job.name, "IMAGE_PROCESSING");
    /// assert!(!job.content_digest.is_empty());
    /// ```
    pub fn from_request<F>(
        request: JobRequest,
        plugin: &PluginRef,
        mut resolve_input_digest: F,
    ) -> Result<InternalJob, JobError>
    where
        F: FnMut(&Path) -> io::Result<ContentDigest>,
    {
        let mut input_paths = Vec::with_capacity(request.input_paths.len());
        for path in request.input_paths {
            let content_digest =
                resolve_input_digest(&path).map_err(|source| JobError::InputDigest {
                    path: path.clone(),
                    source,
                })?;
            input_paths.push(JobInput {
                path,
                content_digest,
            });
        }
        // Identity must not depend on the order inputs were listed in.
        input_paths.sort_by(|a, b| a.path.cmp(&b.path));

        let content_digest = content_digest_of(&(
            &request.name,
            &plugin.name,
            &plugin.version,
            &input_paths,
            &request.args,
        ))?;

        Ok(InternalJob {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            content_digest,
            input_paths,
            output_dir: request.output_dir,
            args: request.args,
            created_at: Utc::now(),
        })
    }
}

/// Result map a worker returns on completion.
pub type JobResult = FxHashMap<String, Value>;

/// A submitted job waiting for its worker to finish.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncompleteJobV2 {
    pub job: InternalJob,
    pub plugin: PluginRef,
}

/// A finished job: the result plus the inputs it was computed from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteJobV2 {
    #[serde(default)]
    pub result: JobResult,
    pub input_paths: Vec<JobInput>,
}

/// Digest-keyed ledger of submitted and finished jobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobV2Ledger {
    #[serde(default)]
    pub incomplete: FxHashMap<ContentDigest, IncompleteJobV2>,
    #[serde(default)]
    pub complete: FxHashMap<ContentDigest, CompleteJobV2>,
}

impl JobV2Ledger {
    /// Records a submitted job under its identity digest.
    pub fn enqueue(&mut self, job: InternalJob, plugin: PluginRef) {
        self.incomplete
            .insert(job.content_digest.clone(), IncompleteJobV2 { job, plugin });
    }

    /// Settles the job with the given digest, moving it from the
    /// incomplete to the complete table.
    ///
    /// Returns the settled entry, or `None` when no such job was pending.
    pub fn settle(
        &mut self,
        content_digest: &str,
        result: JobResult,
    ) -> Option<&CompleteJobV2> {
        let pending = self.incomplete.remove(content_digest)?;
        self.complete.insert(
            content_digest.to_string(),
            CompleteJobV2 {
                result,
                input_paths: pending.job.input_paths,
            },
        );
        self.complete.get(content_digest)
    }

    /// Drops a finished job whose inputs no longer exist.
    pub fn remove_stale(&mut self, content_digest: &str) {
        self.complete.remove(content_digest);
        self.incomplete.remove(content_digest);
    }

    /// Result of a previously finished job, if any.
    #[must_use]
    pub fn result_for(&self, content_digest: &str) -> Option<&JobResult> {
        self.complete.get(content_digest).map(|entry| &entry.result)
    }

    /// Returns `true` while any job is still pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.incomplete.is_empty()
    }
}

// ============================================================================
// Legacy V1 Jobs (id-keyed, free-form)
// ============================================================================

/// Free-form job object of the legacy job API.
///
/// Deprecated alongside the API itself; only `id` ever had defined
/// meaning, the rest is whatever the plugin put there.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyJob {
    pub id: String,
    #[serde(flatten)]
    pub data: FxHashMap<String, Value>,
}

impl LegacyJob {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: FxHashMap::default(),
        }
    }
}

/// Ledger of the legacy job API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyJobLedger {
    #[serde(default)]
    pub active: Vec<LegacyJob>,
    #[serde(default)]
    pub done: Vec<LegacyJob>,
}

impl LegacyJobLedger {
    /// Adds or replaces an active job by id.
    pub fn upsert_active(&mut self, job: LegacyJob) {
        if let Some(existing) = self.active.iter_mut().find(|j| j.id == job.id) {
            *existing = job;
        } else {
            self.active.push(job);
        }
    }

    /// Moves the job out of the active list and appends the final version
    /// to `done`.
    pub fn finish(&mut self, job: LegacyJob) {
        self.active.retain(|j| j.id != job.id);
        self.done.push(job);
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while turning a job request into an owned job.
#[derive(Debug, Error, Diagnostic)]
pub enum JobError {
    /// An input file could not be digested.
    #[error("failed to digest job input {path}: {source}")]
    #[diagnostic(
        code(siteloom::jobs::input_digest),
        help("Check that every input path exists and is readable.")
    )]
    InputDigest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The job identity digest could not be computed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Digest(#[from] DigestError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(inputs: &[&str]) -> JobRequest {
        JobRequest {
            name: "IMAGE_PROCESSING".to_string(),
            input_paths: inputs.iter().map(PathBuf::from).collect(),
            output_dir: PathBuf::from("/out"),
            args: json!({"width": 400}),
        }
    }

    fn digest_by_path(path: &Path) -> io::Result<ContentDigest> {
        Ok(crate::digest::content_digest_of_bytes(
            path.to_string_lossy().as_bytes(),
        ))
    }

    #[test]
    fn test_job_digest_ignores_input_order() {
        let plugin = PluginRef::new("p1", "plugin-sharp", "4.0.0");
        let a = InternalJob::from_request(request(&["/a.jpg", "/b.jpg"]), &plugin, digest_by_path)
            .unwrap();
        let b = InternalJob::from_request(request(&["/b.jpg", "/a.jpg"]), &plugin, digest_by_path)
            .unwrap();
        assert_eq!(a.content_digest, b.content_digest);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_job_digest_tracks_args() {
        let plugin = PluginRef::new("p1", "plugin-sharp", "4.0.0");
        let a = InternalJob::from_request(request(&["/a.jpg"]), &plugin, digest_by_path).unwrap();
        let mut changed = request(&["/a.jpg"]);
        changed.args = json!({"width": 800});
        let b = InternalJob::from_request(changed, &plugin, digest_by_path).unwrap();
        assert_ne!(a.content_digest, b.content_digest);
    }

    #[test]
    fn test_ledger_settle_moves_job() {
        let plugin = PluginRef::new("p1", "plugin-sharp", "4.0.0");
        let job = InternalJob::from_request(request(&["/a.jpg"]), &plugin, digest_by_path).unwrap();
        let digest = job.content_digest.clone();

        let mut ledger = JobV2Ledger::default();
        ledger.enqueue(job, plugin);
        assert!(ledger.has_pending());

        let mut result = JobResult::default();
        result.insert("outputs".to_string(), json!(["/out/a-400.jpg"]));
        ledger.settle(&digest, result);

        assert!(!ledger.has_pending());
        assert!(ledger.result_for(&digest).is_some());
    }

    #[test]
    fn test_legacy_ledger_finish() {
        let mut ledger = LegacyJobLedger::default();
        ledger.upsert_active(LegacyJob::new("job-1"));
        ledger.upsert_active(LegacyJob::new("job-1"));
        assert_eq!(ledger.active.len(), 1);

        ledger.finish(LegacyJob::new("job-1"));
        assert!(ledger.active.is_empty());
        assert_eq!(ledger.done.len(), 1);
    }
}
