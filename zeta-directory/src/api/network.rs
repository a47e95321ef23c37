//! ネットワーク情報・スナップショット・統計API

use super::error::AppError;
use crate::snapshot::Snapshot;
use crate::types::endpoint::EndpointHealth;
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// ネットワーク情報レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfoResponse {
    /// pub/subトピック
    pub topic: String,
    /// プロトコルバージョン
    pub protocol_version: String,
    /// 最大メッセージ長
    pub max_message_length: u32,
    /// 配布中のリレー数
    pub relay_count: usize,
    /// ディレクトリバージョン
    pub directory_version: u64,
}

/// GET /api/network-info, GET /api/info
pub async fn network_info(State(state): State<AppState>) -> Json<NetworkInfoResponse> {
    let snapshot = state.snapshots.current().await;
    Json(NetworkInfoResponse {
        topic: state.network.topic.clone(),
        protocol_version: state.network.protocol_version.clone(),
        max_message_length: state.network.max_message_length,
        relay_count: snapshot.endpoints.len(),
        directory_version: snapshot.directory_version,
    })
}

/// スナップショット取得クエリ
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotQuery {
    /// Unreachableを含めるか（省略時は設定値）
    pub include_unreachable: Option<bool>,
}

/// GET /api/snapshot
pub async fn get_snapshot(
    State(state): State<AppState>,
    query: Result<Query<SnapshotQuery>, QueryRejection>,
) -> Result<Json<Snapshot>, AppError> {
    let Query(query) = query?;
    let snapshot = state.snapshots.get(query.include_unreachable).await;
    Ok(Json(snapshot.as_ref().clone()))
}

/// ネットワーク全体の状態
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    /// すべての確認済みリレーが稼働中
    Operational,
    /// 一部のリレーに問題あり
    Degraded,
    /// 稼働中のリレーなし
    Offline,
}

/// 統計レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// 登録済みリレー総数
    pub total_relays: usize,
    /// Healthy数
    pub healthy: usize,
    /// Degraded数
    pub degraded: usize,
    /// Unknown数
    pub unknown: usize,
    /// Unreachable数
    pub unreachable: usize,
    /// ディレクトリバージョン
    pub directory_version: u64,
    /// ネットワーク状態
    pub network_status: NetworkStatus,
}

impl StatsResponse {
    /// スナップショットから集計
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let healthy = snapshot.count(EndpointHealth::Healthy);
        let degraded = snapshot.count(EndpointHealth::Degraded);
        let unreachable = snapshot.count(EndpointHealth::Unreachable);

        let network_status = if healthy == 0 && degraded == 0 {
            NetworkStatus::Offline
        } else if degraded == 0 && unreachable == 0 {
            NetworkStatus::Operational
        } else {
            NetworkStatus::Degraded
        };

        Self {
            total_relays: snapshot.endpoints.len(),
            healthy,
            degraded,
            unknown: snapshot.count(EndpointHealth::Unknown),
            unreachable,
            directory_version: snapshot.directory_version,
            network_status,
        }
    }
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.snapshots.get(Some(true)).await;
    Json(StatsResponse::from_snapshot(&snapshot))
}
