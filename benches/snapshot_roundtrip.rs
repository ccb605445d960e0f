use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use siteloom_store::node::ContentNode;
use siteloom_store::state::{BuildState, CachedState};
use std::hint::black_box;

const NODE_COUNTS: &[usize] = &[100, 1_000, 10_000];

fn state_with_nodes(count: usize) -> BuildState {
    let mut state = BuildState::default();
    for i in 0..count {
        let node = ContentNode::builder(format!("post-{i}"), "MarkdownPost")
            .with_owner("source-filesystem")
            .with_field("slug", json!(format!("/blog/post-{i}/")))
            .with_field("title", json!(format!("Post {i}")))
            .build()
            .expect("bench node");
        state.insert_node(node);
    }
    state
}

fn snapshot_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_roundtrip");

    for &count in NODE_COUNTS {
        let state = state_with_nodes(count);
        let cached = state.to_cached();
        let encoded = serde_json::to_vec(&cached).expect("encode");

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("project_encode", count), &state, |b, s| {
            b.iter(|| serde_json::to_vec(&black_box(s).to_cached()).expect("encode"));
        });
        group.bench_with_input(
            BenchmarkId::new("decode_hydrate", count),
            &encoded,
            |b, bytes| {
                b.iter(|| {
                    let cached: CachedState =
                        serde_json::from_slice(black_box(bytes)).expect("decode");
                    BuildState::from_cached(cached)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, snapshot_roundtrip);
criterion_main!(benches);
