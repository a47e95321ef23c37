//! ディレクトリスナップショット
//!
//! クライアントへ配布する、順序付きリレー一覧とネットワークパラメータの組。

pub mod cache;

pub use cache::SnapshotCache;

use crate::registry::{RelayRegistry, StoreView};
use crate::types::endpoint::{EndpointHealth, EndpointRecord};
use crate::types::network::NetworkParameters;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// 生成済みスナップショット（不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Healthy → Degraded → Unknown (→ Unreachable) の順、同順位は挿入順
    pub endpoints: Vec<EndpointRecord>,
    /// ネットワークパラメータ
    #[serde(rename = "network")]
    pub network_parameters: NetworkParameters,
    /// 生成時刻
    pub generated_at: DateTime<Utc>,
    /// 元になったストアのバージョン
    pub directory_version: u64,
}

impl Snapshot {
    /// 指定したヘルス状態のエンドポイント数
    pub fn count(&self, health: EndpointHealth) -> usize {
        self.endpoints.iter().filter(|e| e.health == health).count()
    }
}

/// スナップショットの生成
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    network: Arc<NetworkParameters>,
    include_unreachable: bool,
}

impl SnapshotBuilder {
    /// 新しいビルダーを作成（Unreachableは除外）
    pub fn new(network: Arc<NetworkParameters>) -> Self {
        Self {
            network,
            include_unreachable: false,
        }
    }

    /// Unreachableを含めるかどうか
    pub fn include_unreachable(mut self, include: bool) -> Self {
        self.include_unreachable = include;
        self
    }

    /// ストアの読み取りビューからスナップショットを組み立てる
    pub fn build_from_view(&self, view: StoreView, now: DateTime<Utc>) -> Snapshot {
        let mut endpoints: Vec<EndpointRecord> = view
            .records
            .into_iter()
            .filter(|r| self.include_unreachable || r.health != EndpointHealth::Unreachable)
            .collect();
        endpoints.sort_by_key(|r| (r.health.rank(), r.position));

        Snapshot {
            endpoints,
            network_parameters: (*self.network).clone(),
            generated_at: now,
            directory_version: view.version,
        }
    }

    /// レジストリの現在の状態からスナップショットを生成
    pub async fn build(&self, registry: &RelayRegistry) -> Snapshot {
        let view = registry.snapshot_view().await;
        self.build_from_view(view, Utc::now())
    }
}
