//! Aggregate behavior: index maintenance and the cached projection.

mod common;

use common::{populated_state, sample_node};
use siteloom_store::state::{BuildState, CachedState};

#[test]
fn test_cached_round_trip_preserves_every_slice() {
    let state = populated_state();
    let cached = state.to_cached();

    let restored = BuildState::from_cached(cached.clone());

    assert_eq!(restored.nodes, state.nodes);
    assert_eq!(restored.status, state.status);
    assert_eq!(
        restored.component_data_dependencies,
        state.component_data_dependencies
    );
    assert_eq!(restored.components, state.components);
    assert_eq!(restored.jobs_v2, state.jobs_v2);
    assert_eq!(
        restored.static_query_components,
        state.static_query_components
    );
    assert_eq!(restored.compilation_hash, state.compilation_hash);
    assert_eq!(restored.page_data_stats, state.page_data_stats);
    assert_eq!(restored.page_data, state.page_data);

    // The projection itself is stable under a second round trip.
    assert_eq!(restored.to_cached(), cached);
}

#[test]
fn test_cached_round_trip_reconstructs_the_type_index() {
    let state = populated_state();
    let restored = BuildState::from_cached(state.to_cached());

    assert_eq!(restored.nodes_by_type, state.nodes_by_type);
    assert_eq!(restored.nodes_of_type("MarkdownPost").count(), 2);
    assert_eq!(restored.nodes_of_type("Author").count(), 1);
}

#[test]
fn test_transient_slices_reset_on_hydration() {
    let mut state = populated_state();
    state.touch_node("post-1");
    state.logs.record(siteloom_store::diagnostics::LogEvent::error(
        "query-running",
        "boom",
    ));

    let restored = BuildState::from_cached(state.to_cached());

    // Touched nodes and logs belong to the run that recorded them.
    assert!(restored.nodes_touched.is_empty());
    assert_eq!(restored.logs.error_count(), 0);
    assert!(restored.last_action.is_none());
    assert!(restored.schema.is_empty());
}

#[test]
fn test_cached_state_serializes_through_json() {
    let cached = populated_state().to_cached();

    let encoded = serde_json::to_string(&cached).unwrap();
    let decoded: CachedState = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, cached);
}

#[test]
fn test_empty_cached_state_serializes_to_an_empty_object() {
    let encoded = serde_json::to_value(CachedState::default()).unwrap();
    assert_eq!(encoded, serde_json::json!({}));

    let decoded: CachedState = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(decoded, CachedState::default());
}

#[test]
fn test_counters_survive_hydration_without_collisions() {
    let mut state = BuildState::default();
    state.insert_node(sample_node("a", "Post"));
    state.insert_node(sample_node("b", "Post"));
    state.remove_node("a");

    let mut restored = BuildState::from_cached(state.to_cached());
    restored.insert_node(sample_node("c", "Post"));

    // "b" kept counter 2, so the new node must be numbered past it.
    assert_eq!(restored.node("c").unwrap().internal.counter, 3);
}
