//! リレー一覧・管理API

use super::error::AppError;
use crate::types::endpoint::{EndpointHealth, EndpointId, EndpointRecord, NewEndpoint};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// クライアント向けのリレー要約（`GET /api/relays`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySummary {
    /// ID
    pub id: EndpointId,
    /// 表示名
    pub name: String,
    /// WebSocket URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws: Option<String>,
    /// APIベースURL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// ヘルス状態
    pub health: EndpointHealth,
}

impl From<&EndpointRecord> for RelaySummary {
    fn from(record: &EndpointRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.display_name.clone(),
            ws: record.websocket_url.clone(),
            api: record.api_base_url.clone(),
            health: record.health,
        }
    }
}

/// リレー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateRelayRequest {
    /// 明示ID（省略時はURLから導出）
    #[serde(default)]
    pub id: Option<String>,
    /// 表示名
    pub name: String,
    /// WebSocket URL
    #[serde(default)]
    pub ws: Option<String>,
    /// APIベースURL
    #[serde(default)]
    pub api: Option<String>,
}

impl From<CreateRelayRequest> for NewEndpoint {
    fn from(req: CreateRelayRequest) -> Self {
        let endpoint = NewEndpoint::new(req.name, req.ws, req.api);
        match req.id {
            Some(id) => endpoint.with_id(id),
            None => endpoint,
        }
    }
}

/// GET /api/relays
pub async fn list_relays(State(state): State<AppState>) -> Json<Vec<RelaySummary>> {
    let snapshot = state.snapshots.current().await;
    Json(snapshot.endpoints.iter().map(RelaySummary::from).collect())
}

/// POST /api/relays
pub async fn create_relay(
    State(state): State<AppState>,
    payload: Result<Json<CreateRelayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EndpointRecord>), AppError> {
    let Json(req) = payload?;
    let record = state.registry.add_endpoint(req.into()).await?;
    state.snapshots.invalidate().await;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/relays/:id
pub async fn delete_relay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.registry.remove_endpoint(&EndpointId::new(id)).await?;
    state.snapshots.invalidate().await;
    Ok(StatusCode::NO_CONTENT)
}
