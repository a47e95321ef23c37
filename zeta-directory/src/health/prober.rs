//! ヘルスプローバー
//!
//! 登録済みエンドポイントごとに1つの定期プローブタスクを維持する。
//! レジストリの変更通知を受けるたびにタスク集合を再調整する。

use super::probe::{ProbeError, ProbeTarget, RelayProbe};
use crate::registry::RelayRegistry;
use crate::shutdown::ShutdownController;
use crate::types::endpoint::{EndpointId, EndpointRecord};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// デフォルトのチェック間隔
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// デフォルトのプローブタイムアウト
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// ヘルスプローバー
#[derive(Clone)]
pub struct HealthProber {
    registry: RelayRegistry,
    probe: Arc<dyn RelayProbe>,
    check_interval: Duration,
    probe_timeout: Duration,
}

impl HealthProber {
    /// 新しいプローバーを作成
    pub fn new(registry: RelayRegistry, probe: Arc<dyn RelayProbe>) -> Self {
        Self {
            registry,
            probe,
            check_interval: DEFAULT_CHECK_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// プローブタイムアウトを設定
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// エンドポイントを1回プローブし、結果を反映する
    ///
    /// エンドポイントが既に削除されていれば`None`。
    pub async fn probe_endpoint_once(&self, id: &EndpointId) -> Option<EndpointRecord> {
        // ロックはここで解放され、ネットワーク中は保持しない
        let record = self.registry.get(id).await?;

        let outcome = match ProbeTarget::for_record(&record) {
            Some(target) => {
                match tokio::time::timeout(self.probe_timeout, self.probe.probe(&target)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProbeError::Timeout(self.probe_timeout)),
                }
            }
            None => Err(ProbeError::Failure("no probeable address".to_string())),
        };

        if let Err(e) = &outcome {
            debug!(relay_id = %id, error = %e, "Relay probe failed");
        }

        // 結果反映までの間に削除された場合はNotFoundになる
        self.registry
            .record_probe_result(id, outcome.is_ok(), Utc::now())
            .await
            .ok()
    }

    /// 全エンドポイントを並列に1回プローブ
    pub async fn probe_all_once(&self) -> Vec<EndpointRecord> {
        let ids = self.registry.ids().await;
        join_all(ids.iter().map(|id| self.probe_endpoint_once(id)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    fn spawn_endpoint_task(&self, id: EndpointId, shutdown: ShutdownController) -> JoinHandle<()> {
        let prober = self.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(prober.check_interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    // 初回のtickは即座に完了する
                    _ = timer.tick() => {
                        if prober.probe_endpoint_once(&id).await.is_none() {
                            debug!(relay_id = %id, "Relay removed, stopping probe task");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// プローブタスクの集合を現在の登録内容に合わせる
    async fn reconcile(
        &self,
        tasks: &mut HashMap<EndpointId, JoinHandle<()>>,
        shutdown: &ShutdownController,
    ) {
        let ids = self.registry.ids().await;

        tasks.retain(|id, handle| {
            let keep = ids.contains(id) && !handle.is_finished();
            if !keep {
                handle.abort();
            }
            keep
        });

        for id in ids {
            if !tasks.contains_key(&id) {
                debug!(relay_id = %id, "Starting probe task");
                let handle = self.spawn_endpoint_task(id.clone(), shutdown.clone());
                tasks.insert(id, handle);
            }
        }
    }

    /// バックグラウンドで監視を開始
    ///
    /// 返されるハンドルはシャットダウン要求後、全タスクを停止してから完了する。
    pub fn start(self, shutdown: ShutdownController) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut changes = self.registry.subscribe();
            let mut tasks: HashMap<EndpointId, JoinHandle<()>> = HashMap::new();

            info!(
                interval_secs = self.check_interval.as_secs(),
                timeout_secs = self.probe_timeout.as_secs(),
                "Relay health prober started"
            );

            self.reconcile(&mut tasks, &shutdown).await;

            loop {
                tokio::select! {
                    _ = shutdown.wait() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        self.reconcile(&mut tasks, &shutdown).await;
                    }
                }
            }

            for (_, handle) in tasks.drain() {
                handle.abort();
            }
            info!("Relay health prober stopped");
        })
    }
}
