//! Integration tests for the tool surface served over the relay.
//!
//! Drives `tools/list` through the real SSE + POST flow and verifies the
//! read-only mode hides mutating tools.

use super::test_helpers::{
    initialize_session, post_message, spawn_server, spawn_server_with, test_config, SseClient,
};

async fn list_tool_names(base_url: &str) -> Vec<String> {
    let mut sse = SseClient::connect(base_url).await;
    let (_, session_id) = sse.endpoint().await;
    initialize_session(base_url, &session_id, &mut sse).await;

    let resp = post_message(
        base_url,
        &session_id,
        &serde_json::json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {} }),
    )
    .await;
    assert_eq!(resp.status(), 202);

    let event = sse.next_event().await;
    let value: serde_json::Value = serde_json::from_str(&event.data).expect("tools/list result");
    assert_eq!(value["id"], 2);

    value["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .map(|tool| tool["name"].as_str().expect("tool name").to_owned())
        .collect()
}

#[tokio::test]
async fn tools_list_exposes_the_full_surface() {
    let (base_url, ct) = spawn_server().await;

    let names = list_tool_names(&base_url).await;
    for expected in [
        "list_projects",
        "get_project",
        "create_project",
        "delete_project",
        "list_organizations",
        "get_organization",
    ] {
        assert!(names.contains(&expected.to_owned()), "missing {expected}");
    }

    ct.cancel();
}

#[tokio::test]
async fn read_only_mode_hides_mutating_tools() {
    let mut config = test_config(0);
    config.read_only = true;
    let (base_url, ct) = spawn_server_with(config).await;

    let names = list_tool_names(&base_url).await;
    assert!(names.contains(&"list_projects".to_owned()));
    assert!(names.contains(&"get_organization".to_owned()));
    assert!(!names.contains(&"create_project".to_owned()));
    assert!(!names.contains(&"delete_project".to_owned()));

    ct.cancel();
}
