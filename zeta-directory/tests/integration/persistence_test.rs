//! Integration Test: 再起動後もリレー一覧とディレクトリバージョンが保持される

use crate::support::directory::{add_relay, get, test_config, ADMIN_TOKEN};
use axum::http::{Method, StatusCode};
use serde_json::json;
use zeta_directory::registry::RelayRegistry;
use zeta_directory::types::endpoint::HealthPolicy;
use zeta_directory::{api, bootstrap, db};

#[tokio::test]
async fn relays_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("directory.db").display());

    {
        let pool = db::create_pool(&url).await.unwrap();
        let registry = RelayRegistry::with_database(pool.clone(), HealthPolicy::default())
            .await
            .unwrap();
        let app = api::create_app(bootstrap::build_state(registry, &test_config()));

        add_relay(&app, json!({"id": "b", "name": "B", "api": "https://b.example"})).await;
        add_relay(&app, json!({"id": "a", "name": "A", "api": "https://a.example"})).await;
        add_relay(&app, json!({"id": "c", "name": "C", "ws": "wss://c.example/ws"})).await;
        let (status, _) = crate::support::directory::send(
            &app,
            Method::DELETE,
            "/api/relays/c",
            Some(ADMIN_TOKEN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        pool.close().await;
    }

    let pool = db::create_pool(&url).await.unwrap();
    let registry = RelayRegistry::with_database(pool, HealthPolicy::default())
        .await
        .unwrap();
    let app = api::create_app(bootstrap::build_state(registry, &test_config()));

    let (_, relays) = get(&app, "/api/relays").await;
    let ids: Vec<_> = relays
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b", "a"]);

    let (_, info) = get(&app, "/api/info").await;
    assert_eq!(info["directoryVersion"], 4);

    // バージョンは再起動をまたいで単調増加する
    let (status, _) = add_relay(&app, json!({"id": "d", "name": "D", "api": "https://d.example"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, info) = get(&app, "/api/info").await;
    assert_eq!(info["directoryVersion"], 5);
}
