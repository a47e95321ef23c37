//! リレーエンドポイント登録管理
//!
//! エンドポイントの状態をメモリ内で管理し、SQLiteと同期する。
//! すべての変更は書き込みロック下で1つずつ適用され、そのたびに
//! `directory_version`がちょうど1だけ増える。
//!
//! ロック順序は`persist` → `state`。管理操作はDB書き込みの間も`state`を保持するが、
//! プローブ結果と期限切れ削除はメモリへ反映した後に`state`を解放してから書き込む。
//! DBへの書き込みは`persist`によってバージョン順に直列化される。

pub mod retention;
pub mod seed;

use crate::common::error::{DirectoryError, DirectoryResult};
use crate::db::relays as db;
use crate::types::endpoint::{EndpointHealth, EndpointId, EndpointRecord, HealthPolicy, NewEndpoint};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

/// レジストリの読み取り専用コピー
///
/// レコードは挿入順に並ぶ。`version`はコピー取得時点のディレクトリバージョン。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreView {
    /// 全レコード（挿入順）
    pub records: Vec<EndpointRecord>,
    /// 取得時点のディレクトリバージョン
    pub version: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: HashMap<EndpointId, EndpointRecord>,
    version: u64,
    next_position: u64,
}

impl RegistryState {
    fn view(&self) -> StoreView {
        let mut records: Vec<_> = self.records.values().cloned().collect();
        records.sort_by_key(|r| r.position);
        StoreView {
            records,
            version: self.version,
        }
    }
}

/// リレーレジストリ（エンドポイントレコードストア）
///
/// クローンは同じストアを共有する。
#[derive(Clone)]
pub struct RelayRegistry {
    state: Arc<RwLock<RegistryState>>,
    policy: HealthPolicy,
    pool: Option<SqlitePool>,
    persist: Arc<Mutex<()>>,
    changes: Arc<watch::Sender<u64>>,
}

impl RelayRegistry {
    /// 永続化なしのレジストリを作成
    pub fn new(policy: HealthPolicy) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            policy,
            pool: None,
            persist: Arc::new(Mutex::new(())),
            changes: Arc::new(tx),
        }
    }

    /// SQLiteプールからレジストリを作成し、DBからデータを読み込む
    pub async fn with_database(pool: SqlitePool, policy: HealthPolicy) -> DirectoryResult<Self> {
        let records = db::load_relays(&pool).await?;
        let version = db::load_version(&pool).await?;

        let next_position = records.iter().map(|r| r.position + 1).max().unwrap_or(0);
        let records: HashMap<_, _> = records.into_iter().map(|r| (r.id.clone(), r)).collect();

        info!(
            relay_count = records.len(),
            version = version,
            "Loaded relays from database"
        );

        let (tx, _rx) = watch::channel(version);
        Ok(Self {
            state: Arc::new(RwLock::new(RegistryState {
                records,
                version,
                next_position,
            })),
            policy,
            pool: Some(pool),
            persist: Arc::new(Mutex::new(())),
            changes: Arc::new(tx),
        })
    }

    /// ヘルス判定ポリシー
    pub fn policy(&self) -> HealthPolicy {
        self.policy
    }

    /// 変更通知を購読（値は変更後のディレクトリバージョン）
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self, version: u64) {
        self.changes.send_replace(version);
    }

    /// エンドポイントを追加
    ///
    /// IDが既に存在すれば`DuplicateEndpoint`、入力が不正なら`InvalidEndpoint`。
    /// どちらの場合もストアは変更されない。
    pub async fn add_endpoint(&self, request: NewEndpoint) -> DirectoryResult<EndpointRecord> {
        let id = request.validate()?;

        let _persist = self.persist.lock().await;
        let mut state = self.state.write().await;
        if state.records.contains_key(&id) {
            return Err(DirectoryError::DuplicateEndpoint(id));
        }

        let record = EndpointRecord::new(id.clone(), request, state.next_position, Utc::now());
        let version = state.version + 1;

        // DBに保存してからメモリに反映
        if let Some(pool) = &self.pool {
            db::insert_relay(pool, &record, version).await?;
        }

        state.next_position += 1;
        state.records.insert(id, record.clone());
        state.version = version;
        drop(state);

        self.notify(version);
        info!(
            relay_id = %record.id,
            relay_name = %record.display_name,
            version = version,
            "Relay endpoint added"
        );
        Ok(record)
    }

    /// エンドポイントを削除し、削除したレコードを返す
    pub async fn remove_endpoint(&self, id: &EndpointId) -> DirectoryResult<EndpointRecord> {
        let _persist = self.persist.lock().await;
        let mut state = self.state.write().await;
        if !state.records.contains_key(id) {
            return Err(DirectoryError::NotFound(id.clone()));
        }

        let version = state.version + 1;
        if let Some(pool) = &self.pool {
            if !db::delete_relay(pool, id, version).await? {
                warn!(relay_id = %id, "Relay was missing from database during removal");
            }
        }

        let removed = state
            .records
            .remove(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        state.version = version;
        drop(state);

        self.notify(version);
        info!(relay_id = %id, version = version, "Relay endpoint removed");
        Ok(removed)
    }

    /// プローブ結果を反映し、更新後のレコードを返す
    ///
    /// 成功時は連続失敗回数を0に戻してHealthy、失敗時は回数を増やして
    /// ポリシーに従いDegraded/Unreachableへ遷移する。`last_checked_at`は常に更新。
    pub async fn record_probe_result(
        &self,
        id: &EndpointId,
        success: bool,
        at: DateTime<Utc>,
    ) -> DirectoryResult<EndpointRecord> {
        let persist = self.persist.lock().await;
        let mut state = self.state.write().await;
        let version = state.version + 1;

        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        let before = record.health;
        if success {
            record.apply_probe_success(at);
        } else {
            record.apply_probe_failure(at, &self.policy);
        }
        let updated = record.clone();
        state.version = version;
        drop(state);
        self.notify(version);

        // ヘルス状態は実行時の情報なので、DB書き込み失敗でもメモリ上の変更は維持する
        if let Some(pool) = &self.pool {
            if let Err(e) = db::update_relay_health(pool, &updated, version).await {
                warn!(relay_id = %id, error = %e, "Failed to persist probe result");
            }
        }
        drop(persist);

        if before != updated.health {
            info!(
                relay_id = %id,
                from = %before,
                to = %updated.health,
                consecutive_failures = updated.consecutive_failures,
                "Relay health changed"
            );
        } else {
            debug!(
                relay_id = %id,
                health = %updated.health,
                consecutive_failures = updated.consecutive_failures,
                "Probe result recorded"
            );
        }
        Ok(updated)
    }

    /// 一定期間以上Unreachableのままのエンドポイントを削除
    ///
    /// 削除1件ごとにバージョンが1増える。削除したIDを返す。
    /// 保持期間が表現可能な時刻の範囲を超える場合は何も削除しない。
    pub async fn evict_unreachable(
        &self,
        retention: chrono::Duration,
        now: DateTime<Utc>,
    ) -> DirectoryResult<Vec<EndpointId>> {
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            debug!(
                retention_secs = retention.num_seconds(),
                "Retention window exceeds the representable time range"
            );
            return Ok(Vec::new());
        };

        let persist = self.persist.lock().await;
        let mut state = self.state.write().await;

        let expired: Vec<EndpointId> = state
            .records
            .values()
            .filter(|r| {
                r.health == EndpointHealth::Unreachable
                    && r.unreachable_since.is_some_and(|since| since <= cutoff)
            })
            .map(|r| r.id.clone())
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            let version = state.version + 1;
            state.records.remove(&id);
            state.version = version;
            info!(relay_id = %id, version = version, "Evicted unreachable relay");
            evicted.push((id, version));
        }
        let version = state.version;
        drop(state);

        if evicted.is_empty() {
            return Ok(Vec::new());
        }
        self.notify(version);

        if let Some(pool) = &self.pool {
            for (id, version) in &evicted {
                if let Err(e) = db::delete_relay(pool, id, *version).await {
                    warn!(relay_id = %id, error = %e, "Failed to persist eviction");
                }
            }
        }
        drop(persist);

        Ok(evicted.into_iter().map(|(id, _)| id).collect())
    }

    /// 全レコードの一貫したコピーを取得
    pub async fn snapshot_view(&self) -> StoreView {
        self.state.read().await.view()
    }

    /// エンドポイントを取得
    pub async fn get(&self, id: &EndpointId) -> Option<EndpointRecord> {
        self.state.read().await.records.get(id).cloned()
    }

    /// 登録済みIDの一覧
    pub async fn ids(&self) -> Vec<EndpointId> {
        self.state.read().await.records.keys().cloned().collect()
    }

    /// 現在のディレクトリバージョン
    pub async fn version(&self) -> u64 {
        self.state.read().await.version
    }

    /// 登録数
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// 登録が0件か
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}
