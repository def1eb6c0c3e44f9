//! Integration tests for the HTTP health endpoint.
//!
//! Validates that `GET /health` returns `200 OK` with body `"ok"`.
//! Uses an ephemeral port to avoid conflicts with running instances.

use super::test_helpers::spawn_server;

#[tokio::test]
async fn health_returns_ok() {
    let (base_url, ct) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/health"))
        .await
        .expect("HTTP GET /health");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert_eq!(body, "ok");

    ct.cancel();
}

#[tokio::test]
async fn non_existent_route_returns_404() {
    let (base_url, ct) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/nonexistent"))
        .await
        .expect("HTTP GET /nonexistent");

    assert_eq!(resp.status(), 404);
    ct.cancel();
}

#[tokio::test]
async fn message_endpoint_rejects_get() {
    let (base_url, ct) = spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/messages?sessionId=whatever"))
        .await
        .expect("HTTP GET /messages");

    assert_eq!(resp.status(), 405);
    ct.cancel();
}
