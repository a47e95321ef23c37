//! Contract Test: POST /api/relays

use crate::support::directory::{add_relay, create_test_directory, get, send, ADMIN_TOKEN};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn post_relay_returns_created_record() {
    let (app, state) = create_test_directory();

    let (status, body) = add_relay(
        &app,
        json!({"id": "eu1", "name": "EU 1", "ws": "wss://a/ws", "api": "https://a"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "eu1");
    assert_eq!(body["displayName"], "EU 1");
    assert_eq!(body["websocketURL"], "wss://a/ws");
    assert_eq!(body["apiBaseURL"], "https://a");
    assert_eq!(body["health"], "unknown");
    assert_eq!(body["consecutiveFailures"], 0);
    assert!(body["lastCheckedAt"].is_null());
    assert_eq!(state.registry.version().await, 1);
}

#[tokio::test]
async fn post_relay_derives_id_when_omitted() {
    let (app, _state) = create_test_directory();

    let (status, first) = add_relay(&app, json!({"name": "Auto", "api": "https://auto.example"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(first["id"].as_str().is_some_and(|id| !id.is_empty()));

    // 同じアドレスからは同じIDが導出される
    let (status, body) = add_relay(&app, json!({"name": "Auto 2", "api": "https://auto.example"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ENDPOINT");
}

#[tokio::test]
async fn post_duplicate_relay_returns_conflict_and_keeps_store() {
    let (app, state) = create_test_directory();
    let relay = json!({"id": "eu1", "name": "EU 1", "api": "https://a"});

    add_relay(&app, relay.clone()).await;
    let (status, body) = add_relay(&app, relay).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ENDPOINT");
    assert_eq!(state.registry.version().await, 1);
    assert_eq!(state.registry.len().await, 1);
}

#[tokio::test]
async fn post_relay_with_invalid_urls_returns_bad_request() {
    let (app, state) = create_test_directory();

    for body in [
        json!({"name": "No urls"}),
        json!({"name": "Bad ws", "ws": "http://a"}),
        json!({"name": "Bad api", "api": "not a url"}),
        json!({"name": "Both bad", "ws": "https://a/ws", "api": "ftp://a"}),
        json!({"name": "  ", "api": "https://a"}),
    ] {
        let (status, response) = add_relay(&app, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response["code"], "INVALID_ENDPOINT");
    }
    assert_eq!(state.registry.version().await, 0);
}

#[tokio::test]
async fn post_relay_with_one_malformed_url_keeps_the_valid_one() {
    let (app, state) = create_test_directory();

    let (status, body) = add_relay(
        &app,
        json!({"id": "eu1", "name": "EU 1", "ws": "not a url", "api": "https://a"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "eu1");
    assert!(body["websocketURL"].is_null());
    assert_eq!(body["apiBaseURL"], "https://a");
    assert_eq!(state.registry.version().await, 1);
}

#[tokio::test]
async fn post_relay_with_malformed_json_returns_bad_request() {
    let (app, _state) = create_test_directory();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/relays",
        Some(ADMIN_TOKEN),
        Some(json!({"ws": "wss://a/ws"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn post_relay_requires_admin_token() {
    let (app, state) = create_test_directory();
    let relay = json!({"id": "eu1", "name": "EU 1", "api": "https://a"});

    let (status, body) = send(&app, Method::POST, "/api/relays", None, Some(relay.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::POST, "/api/relays", Some("wrong"), Some(relay)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(state.registry.is_empty().await);
    let (status, _) = get(&app, "/api/relays").await;
    assert_eq!(status, StatusCode::OK);
}
