//! ディレクトリ自身のヘルスチェックAPI

use crate::types::endpoint::EndpointHealth;
use crate::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Healthyなリレーが1つ以上あれば"ok"、なければ"degraded"
    pub status: String,
    /// 応答時刻
    pub timestamp: DateTime<Utc>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshots.current().await;
    let status = if snapshot.count(EndpointHealth::Healthy) > 0 {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
    })
}
