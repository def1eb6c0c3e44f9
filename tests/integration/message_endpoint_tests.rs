//! Integration tests for the message endpoint's error semantics.
//!
//! A POST only ever touches the registry through lookup; these tests
//! exercise the 400-class rejections that never reach a session.

use super::test_helpers::{post_message, spawn_server, SseClient};

#[tokio::test]
async fn missing_session_id_is_rejected_without_lookup() {
    let (base_url, ct) = spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/messages"))
        .header("content-type", "application/json")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .send()
        .await
        .expect("POST without sessionId");

    assert_eq!(resp.status(), 400);
    let body = resp.text().await.expect("body");
    assert!(body.contains("sessionId"));

    ct.cancel();
}

#[tokio::test]
async fn empty_session_id_is_rejected() {
    let (base_url, ct) = spawn_server().await;

    let resp = post_message(
        &base_url,
        "",
        &serde_json::json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body = resp.text().await.expect("body");
    assert!(body.contains("sessionId"));

    ct.cancel();
}

#[tokio::test]
async fn unknown_session_id_yields_no_active_session() {
    let (base_url, ct) = spawn_server().await;

    let resp = post_message(
        &base_url,
        "unknown-id",
        &serde_json::json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body = resp.text().await.expect("body");
    assert!(body.contains("no active session"));

    ct.cancel();
}

#[tokio::test]
async fn unknown_session_id_does_not_affect_live_sessions() {
    let (base_url, ct) = spawn_server().await;

    let mut sse = SseClient::connect(&base_url).await;
    let (_, session_id) = sse.endpoint().await;

    // A bogus-id POST must not mutate registry state for the live session.
    let resp = post_message(
        &base_url,
        "bogus-id",
        &serde_json::json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // The live session still accepts messages.
    let resp = post_message(
        &base_url,
        &session_id,
        &serde_json::json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "relay-tests", "version": "0.0.0" }
            }
        }),
    )
    .await;
    assert_eq!(resp.status(), 202);

    ct.cancel();
}

#[tokio::test]
async fn malformed_body_is_rejected_with_400() {
    let (base_url, ct) = spawn_server().await;

    let mut sse = SseClient::connect(&base_url).await;
    let (_, session_id) = sse.endpoint().await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/messages?sessionId={session_id}"))
        .header("content-type", "application/json")
        .body("not json at all")
        .send()
        .await
        .expect("POST malformed body");

    assert_eq!(resp.status(), 400);
    let body = resp.text().await.expect("body");
    assert!(body.contains("invalid message body"));

    ct.cancel();
}
