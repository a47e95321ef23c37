//! Contract Test: GET /api/network-info, /api/info, /api/snapshot, /api/stats, /health

use crate::support::directory::{add_relay, create_test_directory, create_test_directory_with, get, test_config};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use zeta_directory::types::endpoint::EndpointId;
use zeta_directory::types::network::NetworkParameters;

#[tokio::test]
async fn network_info_reports_parameters_and_counts() {
    let (app, _state) = create_test_directory();
    add_relay(&app, json!({"id": "eu1", "name": "EU 1", "api": "https://a"})).await;

    for path in ["/api/network-info", "/api/info"] {
        let (status, body) = get(&app, path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "topic": "/zeta2/social/v1",
                "protocolVersion": "1.0.0",
                "maxMessageLength": 280,
                "relayCount": 1,
                "directoryVersion": 1
            })
        );
    }
}

#[tokio::test]
async fn network_info_uses_configured_parameters() {
    let mut config = test_config();
    config.network = NetworkParameters::new("/zeta2/test/v2", "2.1.0", 500).unwrap();
    let (app, _state) = create_test_directory_with(config);

    let (_, body) = get(&app, "/api/info").await;
    assert_eq!(body["topic"], "/zeta2/test/v2");
    assert_eq!(body["protocolVersion"], "2.1.0");
    assert_eq!(body["maxMessageLength"], 500);
    assert_eq!(body["relayCount"], 0);
}

#[tokio::test]
async fn snapshot_includes_unreachable_on_request() {
    let (app, state) = create_test_directory();
    add_relay(&app, json!({"id": "up", "name": "Up", "api": "https://up.example"})).await;
    add_relay(&app, json!({"id": "down", "name": "Down", "api": "https://down.example"})).await;
    state
        .registry
        .record_probe_result(&EndpointId::new("up"), true, Utc::now())
        .await
        .unwrap();
    for _ in 0..3 {
        state
            .registry
            .record_probe_result(&EndpointId::new("down"), false, Utc::now())
            .await
            .unwrap();
    }

    let (status, body) = get(&app, "/api/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"].as_array().unwrap().len(), 1);
    assert_eq!(body["directoryVersion"], 6);
    assert_eq!(body["network"]["protocolVersion"], "1.0.0");
    assert!(body["generatedAt"].is_string());

    let (_, body) = get(&app, "/api/snapshot?include_unreachable=true").await;
    let endpoints = body["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[1]["id"], "down");
    assert_eq!(endpoints[1]["health"], "unreachable");
    assert_eq!(endpoints[1]["consecutiveFailures"], 3);
    assert!(endpoints[1]["unreachableSince"].is_string());

    let (status, body) = get(&app, "/api/snapshot?include_unreachable=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn stats_reflect_real_health() {
    let (app, state) = create_test_directory();
    let (_, body) = get(&app, "/api/stats").await;
    assert_eq!(body["totalRelays"], 0);
    assert_eq!(body["networkStatus"], "offline");

    add_relay(&app, json!({"id": "a", "name": "A", "api": "https://a.example"})).await;
    add_relay(&app, json!({"id": "b", "name": "B", "api": "https://b.example"})).await;
    state
        .registry
        .record_probe_result(&EndpointId::new("a"), true, Utc::now())
        .await
        .unwrap();

    let (_, body) = get(&app, "/api/stats").await;
    assert_eq!(
        body,
        json!({
            "totalRelays": 2,
            "healthy": 1,
            "degraded": 0,
            "unknown": 1,
            "unreachable": 0,
            "directoryVersion": 3,
            "networkStatus": "operational"
        })
    );
}

#[tokio::test]
async fn health_reports_ok_only_with_healthy_relay() {
    let (app, state) = create_test_directory();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert!(body["timestamp"].is_string());

    add_relay(&app, json!({"id": "a", "name": "A", "api": "https://a.example"})).await;
    state
        .registry
        .record_probe_result(&EndpointId::new("a"), true, Utc::now())
        .await
        .unwrap();
    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_bad_request() {
    let (app, _state) = create_test_directory();
    let (status, body) = get(&app, "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
