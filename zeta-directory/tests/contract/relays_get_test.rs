//! Contract Test: GET /api/relays

use crate::support::directory::{add_relay, create_test_directory, create_test_directory_with, get, test_config};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use std::time::Duration;
use zeta_directory::types::endpoint::EndpointId;

#[tokio::test]
async fn get_relays_empty() {
    let (app, _state) = create_test_directory();
    let (status, body) = get(&app, "/api/relays").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn get_relays_uses_client_schema() {
    let (app, _state) = create_test_directory();
    add_relay(&app, json!({"id": "eu1", "name": "EU 1", "ws": "wss://a/ws", "api": "https://a"})).await;

    let (_, body) = get(&app, "/api/relays").await;
    assert_eq!(
        body,
        json!([{"id": "eu1", "name": "EU 1", "ws": "wss://a/ws", "api": "https://a", "health": "unknown"}])
    );
}

#[tokio::test]
async fn get_relays_orders_by_health_and_hides_unreachable() {
    let (app, state) = create_test_directory();
    for id in ["unknown", "degraded", "healthy", "down"] {
        add_relay(&app, json!({"id": id, "name": id, "api": format!("https://{}.example", id)})).await;
    }

    let registry = &state.registry;
    registry
        .record_probe_result(&EndpointId::new("healthy"), true, Utc::now())
        .await
        .unwrap();
    registry
        .record_probe_result(&EndpointId::new("degraded"), false, Utc::now())
        .await
        .unwrap();
    for _ in 0..3 {
        registry
            .record_probe_result(&EndpointId::new("down"), false, Utc::now())
            .await
            .unwrap();
    }

    let (_, body) = get(&app, "/api/relays").await;
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["healthy", "degraded", "unknown"]);
}

#[tokio::test]
async fn get_relays_is_served_from_cache_until_admin_write() {
    let mut config = test_config();
    config.snapshot_ttl = Duration::from_secs(300);
    let (app, state) = create_test_directory_with(config);

    add_relay(&app, json!({"id": "eu1", "name": "EU 1", "api": "https://a"})).await;
    let (_, body) = get(&app, "/api/relays").await;
    assert_eq!(body[0]["health"], "unknown");

    // プローブ結果はTTL内のキャッシュには反映されない
    state
        .registry
        .record_probe_result(&EndpointId::new("eu1"), true, Utc::now())
        .await
        .unwrap();
    let (_, body) = get(&app, "/api/relays").await;
    assert_eq!(body[0]["health"], "unknown");

    // 管理APIによる変更はキャッシュを破棄する
    add_relay(&app, json!({"id": "us1", "name": "US 1", "api": "https://b"})).await;
    let (_, body) = get(&app, "/api/relays").await;
    assert_eq!(body[0]["id"], "eu1");
    assert_eq!(body[0]["health"], "healthy");
    assert_eq!(body.as_array().unwrap().len(), 2);
}
