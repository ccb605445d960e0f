#![allow(dead_code)]

use serde_json::json;
use siteloom_store::jobs::{InternalJob, JobRequest};
use siteloom_store::node::ContentNode;
use siteloom_store::page::Page;
use siteloom_store::plugin::PluginRef;
use siteloom_store::query::ComponentRecord;
use siteloom_store::state::BuildState;

/// Installs a test subscriber so `RUST_LOG=debug cargo test` shows the
/// store's tracing output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sample_plugin() -> PluginRef {
    PluginRef::new("plugin-3f9c", "source-filesystem", "4.2.0")
}

pub fn sample_node(id: &str, type_name: &str) -> ContentNode {
    ContentNode::builder(id, type_name)
        .with_owner("source-filesystem")
        .with_field("slug", json!(format!("/{id}/")))
        .build()
        .expect("fixture node")
}

pub fn sample_page(path: &str) -> Page {
    Page::new(path, "/site/src/templates/post.js").with_context("slug", json!(path))
}

pub fn sample_job(name: &str, inputs: &[&str]) -> InternalJob {
    let request = JobRequest {
        name: name.to_string(),
        input_paths: inputs.iter().map(Into::into).collect(),
        output_dir: "/site/public/static".into(),
        args: json!({"width": 400}),
    };
    InternalJob::from_request(request, &sample_plugin(), |path| {
        Ok(siteloom_store::digest::content_digest_of_bytes(
            path.to_string_lossy().as_bytes(),
        ))
    })
    .expect("fixture job")
}

/// A state with every cacheable slice populated, for round-trip tests.
pub fn populated_state() -> BuildState {
    let mut state = BuildState::default();

    state.insert_node(sample_node("post-1", "MarkdownPost"));
    state.insert_node(sample_node("post-2", "MarkdownPost"));
    state.insert_node(sample_node("author-1", "Author"));
    state.touch_node("post-1");

    let page = sample_page("/blog/one/");
    state.pages.insert(page.path.clone(), page);

    state
        .components
        .insert("/site/src/templates/post.js".into(), {
            let mut record = ComponentRecord::new("/site/src/templates/post.js");
            record.query = "query Post { post { title } }".to_string();
            record.pages.insert("/blog/one/".to_string());
            record
        });

    state
        .component_data_dependencies
        .record_node_dependency("post-1", "/blog/one/");
    state
        .component_data_dependencies
        .record_connection_dependency("MarkdownPost", "/blog/");

    let job = sample_job("IMAGE_PROCESSING", &["/site/src/images/hero.jpg"]);
    state.jobs_v2.enqueue(job, sample_plugin());

    state.compilation_hash = "c0ffee".repeat(10);
    state
        .page_data
        .insert("/blog/one/".to_string(), "hash-1".to_string());
    state
        .page_data_stats
        .insert("/site/public/page-data/blog/one.json".into(), 2048);
    state
        .status
        .plugins
        .insert("source-filesystem".to_string(), sample_plugin());
    state.status.plugins_hash = "deadbeef".repeat(8);

    state
}
