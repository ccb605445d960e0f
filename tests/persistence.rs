//! Snapshot persistence: atomic save, gated restore, idempotent delete.

mod common;

use common::{init_tracing, populated_state};
use siteloom_store::persist::{
    FORMAT_VERSION, PersistError, StoreConfig, delete_snapshot, load_snapshot, save_snapshot,
};
use siteloom_store::state::{BuildState, CachedState};
use tempfile::tempdir;

fn config_in(dir: &tempfile::TempDir) -> StoreConfig {
    StoreConfig::default().with_cache_dir(dir.path())
}

#[test]
fn test_save_then_load_round_trips() {
    init_tracing();
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    let cached = populated_state().to_cached();

    let receipt = save_snapshot(&config, &cached).unwrap();
    assert!(!receipt.skipped);
    assert!(receipt.bytes > 0);
    assert_eq!(receipt.path, config.snapshot_path());

    let envelope = load_snapshot(&config).unwrap().expect("snapshot exists");
    assert_eq!(envelope.format_version, FORMAT_VERSION);
    assert_eq!(envelope.build_id, receipt.build_id);
    assert_eq!(envelope.state, cached);

    let restored = BuildState::from_cached(envelope.state);
    assert_eq!(restored.nodes.len(), 3);
}

#[test]
fn test_cold_cache_loads_as_none() {
    let dir = tempdir().unwrap();
    assert!(load_snapshot(&config_in(&dir)).unwrap().is_none());
}

#[test]
fn test_disabled_persistence_writes_nothing() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir).without_persistence();

    let receipt = save_snapshot(&config, &CachedState::default()).unwrap();
    assert!(receipt.skipped);
    assert_eq!(receipt.bytes, 0);
    assert!(!config.snapshot_path().exists());
}

#[test]
fn test_save_leaves_no_temp_files_behind() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    let cached = populated_state().to_cached();

    save_snapshot(&config, &cached).unwrap();
    save_snapshot(&config, &cached).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("state.json")]);
}

#[test]
fn test_truncated_snapshot_reports_corrupt() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    std::fs::write(config.snapshot_path(), b"{\"formatVersion\": 1, \"buildI").unwrap();

    let err = load_snapshot(&config).unwrap_err();
    assert!(matches!(err, PersistError::Corrupt { .. }));
}

#[test]
fn test_newer_format_reports_format_version() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    std::fs::write(
        config.snapshot_path(),
        serde_json::json!({"formatVersion": FORMAT_VERSION + 1, "futureField": true}).to_string(),
    )
    .unwrap();

    let err = load_snapshot(&config).unwrap_err();
    match err {
        PersistError::FormatVersion { found, supported } => {
            assert_eq!(found, FORMAT_VERSION + 1);
            assert_eq!(supported, FORMAT_VERSION);
        }
        other => panic!("expected FormatVersion, got {other:?}"),
    }
}

#[test]
fn test_delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);

    save_snapshot(&config, &populated_state().to_cached()).unwrap();
    assert!(config.snapshot_path().exists());

    delete_snapshot(&config).unwrap();
    assert!(!config.snapshot_path().exists());
    // A second delete of a missing file is still Ok.
    delete_snapshot(&config).unwrap();
    assert!(load_snapshot(&config).unwrap().is_none());
}

#[test]
fn test_save_creates_the_cache_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deep").join("cache");
    let config = StoreConfig::default().with_cache_dir(&nested);

    save_snapshot(&config, &populated_state().to_cached()).unwrap();
    assert!(config.snapshot_path().exists());
}
