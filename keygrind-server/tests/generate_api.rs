//! API validation behaviour that must hold before any device is touched.

use axum_test::TestServer;
use serde_json::{Value, json};

use keygrind_server::{AppState, ServerConfig, routes::create_api_router};

fn test_server() -> TestServer {
    let state = AppState::new(ServerConfig::default());
    TestServer::new(create_api_router(state)).expect("router should start")
}

#[tokio::test]
async fn test_health_endpoint_reports_ok() {
    let server = test_server();

    let response = server.get("/api/v1/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_rejects_request_without_any_pattern() {
    let server = test_server();

    let response = server.post("/api/v1/generate").json(&json!({})).await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("starts_with"), "got: {message}");
}

#[tokio::test]
async fn test_rejects_non_base58_pattern() {
    let server = test_server();

    let response = server
        .post("/api/v1/generate")
        .json(&json!({ "starts_with": "0x" }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("base58"), "got: {message}");
}

#[tokio::test]
async fn test_rejects_zero_count() {
    let server = test_server();

    let response = server
        .post("/api/v1/generate")
        .json(&json!({ "starts_with": "abc", "count": 0 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_rejects_out_of_range_iteration_bits() {
    let server = test_server();

    let response = server
        .post("/api/v1/generate")
        .json(&json!({ "starts_with": "abc", "iteration_bits": 63 }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("iteration_bits"), "got: {message}");
}
