//! Contract Test: DELETE /api/relays/:id

use crate::support::directory::{add_relay, create_test_directory, get, send, ADMIN_TOKEN};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn delete_relay_returns_no_content() {
    let (app, state) = create_test_directory();
    add_relay(&app, json!({"id": "eu1", "name": "EU 1", "api": "https://a"})).await;

    let (status, body) = send(&app, Method::DELETE, "/api/relays/eu1", Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    assert_eq!(state.registry.version().await, 2);

    let (_, relays) = get(&app, "/api/relays").await;
    assert_eq!(relays, json!([]));
}

#[tokio::test]
async fn delete_missing_relay_returns_not_found() {
    let (app, state) = create_test_directory();

    let (status, body) = send(&app, Method::DELETE, "/api/relays/missing", Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(state.registry.version().await, 0);
}

#[tokio::test]
async fn delete_relay_requires_admin_token() {
    let (app, state) = create_test_directory();
    add_relay(&app, json!({"id": "eu1", "name": "EU 1", "api": "https://a"})).await;

    let (status, _) = send(&app, Method::DELETE, "/api/relays/eu1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(state.registry.len().await, 1);
}
