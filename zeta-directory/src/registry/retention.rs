//! Unreachableのまま放置されたリレーの定期削除

use super::RelayRegistry;
use crate::shutdown::ShutdownController;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// 削除処理の実行間隔
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// 保持期間を過ぎたUnreachableリレーを定期的に削除するタスクを起動
///
/// `retention`が0の場合は何もせず`None`を返す。
pub fn spawn_retention_sweeper(
    registry: RelayRegistry,
    retention: Duration,
    sweep_interval: Duration,
    shutdown: ShutdownController,
) -> Option<JoinHandle<()>> {
    if retention.is_zero() {
        info!("Unreachable relay retention disabled");
        return None;
    }
    let retention = match chrono::Duration::from_std(retention) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "Retention window out of range, sweeper not started");
            return None;
        }
    };

    info!(
        retention_secs = retention.num_seconds(),
        interval_secs = sweep_interval.as_secs(),
        "Starting unreachable relay sweeper"
    );

    Some(tokio::spawn(async move {
        let mut timer = tokio::time::interval(sweep_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    info!("Unreachable relay sweeper stopped");
                    break;
                }
                _ = timer.tick() => {
                    match registry.evict_unreachable(retention, Utc::now()).await {
                        Ok(evicted) if !evicted.is_empty() => {
                            info!(count = evicted.len(), "Evicted long-unreachable relays");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "Unreachable relay sweep failed"),
                    }
                }
            }
        }
    }))
}
