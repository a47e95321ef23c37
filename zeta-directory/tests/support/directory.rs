use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use zeta_directory::{
    api, bootstrap, config::DirectoryConfig, registry::RelayRegistry,
    types::endpoint::HealthPolicy, AppState,
};

/// テスト用の管理トークン
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// テスト用の設定（スナップショットキャッシュ無効）
#[allow(dead_code)]
pub fn test_config() -> DirectoryConfig {
    DirectoryConfig {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        snapshot_ttl: Duration::ZERO,
        ..DirectoryConfig::default()
    }
}

/// メモリ上のレジストリでディレクトリを作成する（.oneshot()スタイルのテスト用）
#[allow(dead_code)]
pub fn create_test_directory() -> (Router, AppState) {
    create_test_directory_with(test_config())
}

/// 設定を指定してディレクトリを作成する
#[allow(dead_code)]
pub fn create_test_directory_with(config: DirectoryConfig) -> (Router, AppState) {
    let registry = RelayRegistry::new(HealthPolicy::default());
    let state = bootstrap::build_state(registry, &config);
    (api::create_app(state.clone()), state)
}

/// リクエストを送信し、ステータスとJSONボディを返す
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// GETリクエスト
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

/// 管理トークン付きでリレーを登録
#[allow(dead_code)]
pub async fn add_relay(app: &Router, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/api/relays", Some(ADMIN_TOKEN), Some(body)).await
}
