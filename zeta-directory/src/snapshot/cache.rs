//! TTL付きスナップショットキャッシュ
//!
//! 読み取りAPIはプローブやストアの変更を待たず、キャッシュ済みの
//! スナップショットを返す。TTL経過後の最初の読み取りで再生成する。

use super::{Snapshot, SnapshotBuilder};
use crate::registry::RelayRegistry;
use crate::types::network::NetworkParameters;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// デフォルトのTTL
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    built_at: Instant,
}

#[derive(Debug, Default)]
struct Slots {
    default: Option<CachedSnapshot>,
    with_unreachable: Option<CachedSnapshot>,
}

impl Slots {
    fn peek(&self, include_unreachable: bool) -> Option<&CachedSnapshot> {
        if include_unreachable {
            self.with_unreachable.as_ref()
        } else {
            self.default.as_ref()
        }
    }

    fn slot(&mut self, include_unreachable: bool) -> &mut Option<CachedSnapshot> {
        if include_unreachable {
            &mut self.with_unreachable
        } else {
            &mut self.default
        }
    }
}

/// スナップショットキャッシュ
#[derive(Clone)]
pub struct SnapshotCache {
    registry: RelayRegistry,
    network: Arc<NetworkParameters>,
    ttl: Duration,
    include_unreachable_by_default: bool,
    slots: Arc<RwLock<Slots>>,
}

impl SnapshotCache {
    /// 新しいキャッシュを作成
    pub fn new(registry: RelayRegistry, network: Arc<NetworkParameters>, ttl: Duration) -> Self {
        Self {
            registry,
            network,
            ttl,
            include_unreachable_by_default: false,
            slots: Arc::new(RwLock::new(Slots::default())),
        }
    }

    /// デフォルトでUnreachableを含めるかどうか
    pub fn with_include_unreachable(mut self, include: bool) -> Self {
        self.include_unreachable_by_default = include;
        self
    }

    /// デフォルト設定でスナップショットを取得
    pub async fn current(&self) -> Arc<Snapshot> {
        self.get(None).await
    }

    /// スナップショットを取得（`None`は設定のデフォルト）
    pub async fn get(&self, include_unreachable: Option<bool>) -> Arc<Snapshot> {
        let include = include_unreachable.unwrap_or(self.include_unreachable_by_default);

        if let Some(snapshot) = self.fresh(&*self.slots.read().await, include) {
            return snapshot;
        }
        self.rebuild(include).await
    }

    fn fresh(&self, slots: &Slots, include: bool) -> Option<Arc<Snapshot>> {
        slots
            .peek(include)
            .filter(|cached| cached.built_at.elapsed() < self.ttl)
            .map(|cached| cached.snapshot.clone())
    }

    async fn rebuild(&self, include: bool) -> Arc<Snapshot> {
        let mut slots = self.slots.write().await;
        // 待機中に他のリクエストが再生成していればそれを使う
        if let Some(snapshot) = self.fresh(&slots, include) {
            return snapshot;
        }

        let snapshot = Arc::new(
            SnapshotBuilder::new(self.network.clone())
                .include_unreachable(include)
                .build(&self.registry)
                .await,
        );
        debug!(
            directory_version = snapshot.directory_version,
            endpoint_count = snapshot.endpoints.len(),
            include_unreachable = include,
            "Snapshot rebuilt"
        );
        *slots.slot(include) = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            built_at: Instant::now(),
        });
        snapshot
    }

    /// キャッシュを破棄（管理APIによる変更後に呼ぶ）
    pub async fn invalidate(&self) {
        let mut slots = self.slots.write().await;
        *slots = Slots::default();
    }
}
