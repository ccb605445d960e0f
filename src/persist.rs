//! Snapshot persistence for the cached state subset.
//!
//! One JSON file, `state.json` in the cache directory, holds a versioned
//! [`SnapshotEnvelope`] around the [`CachedState`]. Saves go through a
//! temp file and an atomic rename, so a crash mid-write never clobbers a
//! previously valid snapshot. Restores tolerate an absent file (a cold
//! cache is not an error) and reject snapshots written by a newer format.
//!
//! # Examples
//!
//! ```rust,no_run
//! use siteloom_store::persist::{StoreConfig, load_snapshot, save_snapshot};
//! use siteloom_store::state::BuildState;
//!
//! # fn main() -> Result<(), siteloom_store::persist::PersistError> {
//! let config = StoreConfig::default();
//! let state = BuildState::default();
//!
//! let receipt = save_snapshot(&config, &state.to_cached())?;
//! assert!(!receipt.skipped);
//!
//! let envelope = load_snapshot(&config)?.expect("just saved");
//! let restored = BuildState::from_cached(envelope.state);
//! # let _ = restored;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::state::CachedState;

/// Snapshot format this build reads and writes.
pub const FORMAT_VERSION: u32 = 1;

const SNAPSHOT_FILE: &str = "state.json";

// ============================================================================
// Configuration
// ============================================================================

/// Where and whether the store persists its snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory the snapshot file lives in.
    pub cache_dir: PathBuf,
    /// Persistence kill-switch; when `false`, saves become no-ops.
    pub persist: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".siteloom"),
            persist: true,
        }
    }
}

impl StoreConfig {
    /// Resolves the configuration from the environment.
    ///
    /// Reads `.env` when present, then honors `SITELOOM_CACHE_DIR` and
    /// `SITELOOM_DISABLE_STATE_CACHE` (any non-empty value disables
    /// persistence).
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = StoreConfig::default();
        if let Ok(dir) = std::env::var("SITELOOM_CACHE_DIR") {
            if !dir.is_empty() {
                config.cache_dir = PathBuf::from(dir);
            }
        }
        if std::env::var("SITELOOM_DISABLE_STATE_CACHE").is_ok_and(|v| !v.is_empty()) {
            config.persist = false;
        }
        config
    }

    /// Overrides the cache directory.
    #[must_use]
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Disables persistence; saves return a skipped receipt.
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Path of the snapshot file under this configuration.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// The on-disk shape of a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEnvelope {
    /// Format the snapshot was written with; gates restore.
    pub format_version: u32,
    /// Id of the build that wrote the snapshot.
    pub build_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub state: CachedState,
}

/// What a save produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotReceipt {
    /// Final path of the snapshot file.
    pub path: PathBuf,
    /// Build id stamped into the envelope.
    pub build_id: Uuid,
    /// Serialized size in bytes; zero when skipped.
    pub bytes: u64,
    /// The save was a no-op because persistence is disabled.
    pub skipped: bool,
}

// Probes only the version field, so a newer envelope whose other fields no
// longer parse still reports FormatVersion instead of Corrupt.
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(rename = "formatVersion", default)]
    format_version: u32,
}

// ============================================================================
// I/O
// ============================================================================

/// Serializes the cached state and atomically replaces the snapshot file.
///
/// Creates the cache directory when missing. With persistence disabled the
/// function writes nothing and returns a receipt with `skipped` set.
#[instrument(skip(state), fields(cache_dir = %config.cache_dir.display()))]
pub fn save_snapshot(
    config: &StoreConfig,
    state: &CachedState,
) -> Result<SnapshotReceipt, PersistError> {
    let path = config.snapshot_path();
    let build_id = Uuid::new_v4();

    if !config.persist {
        debug!("state cache disabled, skipping snapshot save");
        return Ok(SnapshotReceipt {
            path,
            build_id,
            bytes: 0,
            skipped: true,
        });
    }

    let envelope = SnapshotEnvelope {
        format_version: FORMAT_VERSION,
        build_id,
        saved_at: Utc::now(),
        state: state.clone(),
    };
    let encoded = serde_json::to_vec(&envelope)
        .map_err(|source| PersistError::Serialize { source })?;

    fs::create_dir_all(&config.cache_dir).map_err(PersistError::Io)?;

    // Write-then-rename keeps the previous snapshot intact until the new
    // one is fully on disk.
    let temp_path = config
        .cache_dir
        .join(format!("{SNAPSHOT_FILE}.tmp-{build_id}"));
    fs::write(&temp_path, &encoded).map_err(PersistError::Io)?;
    if let Err(source) = fs::rename(&temp_path, &path) {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistError::Io(source));
    }

    debug!(bytes = encoded.len(), path = %path.display(), "snapshot saved");
    Ok(SnapshotReceipt {
        path,
        build_id,
        bytes: encoded.len() as u64,
        skipped: false,
    })
}

/// Loads the snapshot, if one exists.
///
/// Returns `Ok(None)` on a cold cache. A snapshot written by a newer
/// format fails with [`PersistError::FormatVersion`]; anything unparsable
/// fails with [`PersistError::Corrupt`].
#[instrument(fields(cache_dir = %config.cache_dir.display()))]
pub fn load_snapshot(config: &StoreConfig) -> Result<Option<SnapshotEnvelope>, PersistError> {
    let path = config.snapshot_path();
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot on disk");
            return Ok(None);
        }
        Err(err) => return Err(PersistError::Io(err)),
    };

    let probe: VersionProbe = serde_json::from_slice(&bytes)
        .map_err(|source| corrupt(&path, source))?;
    if probe.format_version > FORMAT_VERSION {
        warn!(
            found = probe.format_version,
            supported = FORMAT_VERSION,
            "snapshot written by a newer build"
        );
        return Err(PersistError::FormatVersion {
            found: probe.format_version,
            supported: FORMAT_VERSION,
        });
    }

    let envelope: SnapshotEnvelope =
        serde_json::from_slice(&bytes).map_err(|source| corrupt(&path, source))?;
    debug!(build_id = %envelope.build_id, saved_at = %envelope.saved_at, "snapshot loaded");
    Ok(Some(envelope))
}

/// Removes the snapshot file; the on-disk counterpart of the
/// `DELETE_CACHE` action. Idempotent.
#[instrument(fields(cache_dir = %config.cache_dir.display()))]
pub fn delete_snapshot(config: &StoreConfig) -> Result<(), PersistError> {
    match fs::remove_file(config.snapshot_path()) {
        Ok(()) => {
            debug!("snapshot deleted");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(PersistError::Io(err)),
    }
}

fn corrupt(path: &Path, source: serde_json::Error) -> PersistError {
    PersistError::Corrupt {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised by snapshot persistence.
#[derive(Debug, Error, Diagnostic)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    #[diagnostic(
        code(siteloom::persist::io),
        help("Check that the cache directory is writable.")
    )]
    Io(#[from] io::Error),

    /// The cached state could not be encoded.
    #[error("failed to serialize snapshot: {source}")]
    #[diagnostic(code(siteloom::persist::serialize))]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot file exists but cannot be parsed.
    #[error("corrupt snapshot at {path}: {source}")]
    #[diagnostic(
        code(siteloom::persist::corrupt),
        help("Delete the snapshot file to force a cold build.")
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot was written by a newer build than this one.
    #[error("snapshot format {found} is newer than supported {supported}")]
    #[diagnostic(
        code(siteloom::persist::format_version),
        help("Upgrade the build, or delete the snapshot to start cold.")
    )]
    FormatVersion { found: u32, supported: u32 },
}
