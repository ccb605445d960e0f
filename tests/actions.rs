//! Wire-shape tests for the action vocabulary.
//!
//! The tags and payload layouts here are a compatibility surface: older
//! snapshots and external tooling both speak them, so these tests pin the
//! serialized form rather than just round-trip equality.

mod common;

use common::{sample_node, sample_page, sample_plugin};
use serde_json::json;
use siteloom_store::action::{Action, ActionKind, PageDataPayload, StaleJobPayload};
use siteloom_store::page::Redirect;
use siteloom_store::types::ProgramStatus;

#[test]
fn test_serialized_tag_matches_kind() {
    let actions = vec![
        Action::create_node(sample_node("n1", "Post")),
        Action::delete_node("n1"),
        Action::create_page(sample_page("/blog/one/")),
        Action::delete_page(sample_page("/blog/one/")),
        Action::create_redirect(Redirect::new("/old/", "/new/")),
        Action::set_program_status(ProgramStatus::BootstrapFinished, sample_plugin()),
        Action::UpdatePluginsHash {
            payload: "abc".to_string(),
        },
        Action::SetPageData {
            payload: PageDataPayload {
                id: "/blog/one/".to_string(),
                result_hash: "h1".to_string(),
            },
        },
        Action::DeleteCache,
    ];

    for action in actions {
        let wire = serde_json::to_value(&action).unwrap();
        assert_eq!(
            wire["type"].as_str().unwrap(),
            action.kind().as_str(),
            "tag mismatch for {action}"
        );
    }
}

#[test]
fn test_every_kind_parses_from_its_tag() {
    for kind in ActionKind::ALL {
        let parsed: ActionKind = kind.as_str().parse().unwrap();
        assert_eq!(parsed, kind);
        // serde agrees with as_str on the wire form
        let as_json = serde_json::to_value(kind).unwrap();
        assert_eq!(as_json, json!(kind.as_str()));
    }
}

#[test]
fn test_unknown_tag_is_rejected() {
    let result: Result<Action, _> =
        serde_json::from_value(json!({"type": "BUMP_VERSION", "payload": {}}));
    assert!(result.is_err());
    assert!("BUMP_VERSION".parse::<ActionKind>().is_err());
}

#[test]
fn test_optional_attribution_may_be_absent() {
    let action: Action = serde_json::from_value(json!({
        "type": "REMOVE_STALE_JOB_V2",
        "payload": {"content_digest": "abc123"}
    }))
    .unwrap();
    assert_eq!(
        action,
        Action::RemoveStaleJobV2 {
            plugin: None,
            trace_id: None,
            payload: StaleJobPayload {
                content_digest: "abc123".to_string(),
            },
        }
    );
    assert!(action.plugin().is_none());
    assert!(action.trace_id().is_none());
}

#[test]
fn test_missing_required_payload_is_rejected() {
    let result: Result<Action, _> = serde_json::from_value(json!({"type": "DELETE_NODE"}));
    assert!(result.is_err());
}

#[test]
fn test_create_page_round_trips_with_attribution() {
    let action = Action::CreatePage {
        payload: sample_page("/blog/one/"),
        plugin: Some(sample_plugin()),
        context_modified: true,
    };

    let wire = serde_json::to_string(&action).unwrap();
    let back: Action = serde_json::from_str(&wire).unwrap();
    assert_eq!(back, action);
    assert_eq!(back.plugin().unwrap().name, "source-filesystem");
}

#[test]
fn test_delete_cache_round_trips_bare() {
    let wire = serde_json::to_value(&Action::DeleteCache).unwrap();
    assert_eq!(wire, json!({"type": "DELETE_CACHE"}));
    let back: Action = serde_json::from_value(wire).unwrap();
    assert_eq!(back, Action::DeleteCache);
}

#[test]
fn test_node_payload_keeps_plugin_fields_flat() {
    let action = Action::create_node(sample_node("post-1", "MarkdownPost"));
    let wire = serde_json::to_value(&action).unwrap();

    // Plugin-attached fields sit at the top level of the payload object,
    // next to the typed fields.
    assert_eq!(wire["payload"]["slug"], json!("/post-1/"));
    assert_eq!(wire["payload"]["internal"]["type"], json!("MarkdownPost"));
}

#[test]
fn test_display_leads_with_the_tag() {
    let action = Action::delete_node("post-1");
    assert_eq!(action.to_string(), "DELETE_NODE post-1");

    let redirect = Action::create_redirect(Redirect::new("/old/", "/new/"));
    assert_eq!(redirect.to_string(), "CREATE_REDIRECT /old/ -> /new/");
}

#[test]
fn test_trace_id_accessor_covers_schema_family() {
    let action = Action::CreateTypes {
        plugin: sample_plugin(),
        trace_id: Some("trace-42".to_string()),
        payload: vec![siteloom_store::schema::TypeDefinitions::new(
            "type Post implements Node { title: String }",
        )],
    };
    assert_eq!(action.trace_id(), Some("trace-42"));
    assert_eq!(action.plugin().unwrap().name, "source-filesystem");
}
