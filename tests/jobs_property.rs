//! Property tests for job identity digests.
//!
//! The digest is what makes finished jobs reusable across builds, so its
//! two sides are pinned here: insensitive to the order inputs were listed
//! in, sensitive to anything that changes the work itself.

mod common;

use std::io;
use std::path::Path;

use common::sample_plugin;
use proptest::prelude::*;
use serde_json::json;
use siteloom_store::digest::content_digest_of_bytes;
use siteloom_store::jobs::{InternalJob, JobRequest};
use siteloom_store::types::ContentDigest;

fn digest_by_path(path: &Path) -> io::Result<ContentDigest> {
    Ok(content_digest_of_bytes(path.to_string_lossy().as_bytes()))
}

fn job_for(inputs: &[String], args: serde_json::Value) -> InternalJob {
    let request = JobRequest {
        name: "IMAGE_PROCESSING".to_string(),
        input_paths: inputs.iter().map(Into::into).collect(),
        output_dir: "/out".into(),
        args,
    };
    InternalJob::from_request(request, &sample_plugin(), digest_by_path).unwrap()
}

proptest! {
    #[test]
    fn prop_digest_is_input_order_insensitive(
        inputs in prop::collection::vec("/img/[a-z]{1,8}\\.jpg", 1..8),
        rotation in 0usize..8,
    ) {
        let mut rotated = inputs.clone();
        let len = rotated.len().max(1);
        rotated.rotate_left(rotation % len);
        let mut reversed = inputs.clone();
        reversed.reverse();

        let base = job_for(&inputs, json!({"width": 400}));
        prop_assert_eq!(&base.content_digest, &job_for(&rotated, json!({"width": 400})).content_digest);
        prop_assert_eq!(&base.content_digest, &job_for(&reversed, json!({"width": 400})).content_digest);
    }

    #[test]
    fn prop_digest_tracks_args(a in 1u32..4096, b in 1u32..4096) {
        prop_assume!(a != b);
        let inputs = vec!["/img/hero.jpg".to_string()];
        let left = job_for(&inputs, json!({"width": a}));
        let right = job_for(&inputs, json!({"width": b}));
        prop_assert_ne!(left.content_digest, right.content_digest);
    }

    #[test]
    fn prop_digest_tracks_inputs(path in "/img/[a-z]{1,8}\\.jpg") {
        prop_assume!(path != "/img/hero.jpg");
        let left = job_for(&["/img/hero.jpg".to_string()], json!({}));
        let right = job_for(&[path], json!({}));
        prop_assert_ne!(left.content_digest, right.content_digest);
    }
}
