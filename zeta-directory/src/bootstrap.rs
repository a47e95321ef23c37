//! サーバー初期化ロジック
//!
//! データベース接続、レジストリ初期化、シードファイル適用、
//! ヘルスプローバーと保持期間スイーパーの起動を担当する。

use crate::api::auth::AdminAuth;
use crate::config::DirectoryConfig;
use crate::health::{HealthProber, HttpProbe};
use crate::registry::{retention, seed, RelayRegistry};
use crate::shutdown::ShutdownController;
use crate::snapshot::SnapshotCache;
use crate::AppState;
use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// サーバー初期化結果
pub struct InitContext {
    /// アプリケーション状態
    pub state: AppState,
    /// バックグラウンドタスク（プローバー、スイーパー）
    pub background: Vec<JoinHandle<()>>,
}

impl InitContext {
    /// シャットダウンを要求し、バックグラウンドタスクの終了を待つ
    pub async fn shutdown(self) {
        self.state.shutdown.request_shutdown();
        for handle in self.background {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
    }
}

/// 設定とレジストリから`AppState`を組み立てる
pub fn build_state(registry: RelayRegistry, config: &DirectoryConfig) -> AppState {
    let network = Arc::new(config.network.clone());
    let snapshots = SnapshotCache::new(registry.clone(), network.clone(), config.snapshot_ttl)
        .with_include_unreachable(config.include_unreachable);

    let admin = if config.auth_disabled {
        warn!("Admin authentication is DISABLED; anyone can modify the relay directory");
        AdminAuth::disabled()
    } else {
        let admin = AdminAuth::new(config.admin_token.as_deref());
        if !admin.is_configured() {
            warn!("ZETA_ADMIN_TOKEN is not set; relay add/remove requests will be rejected");
        }
        admin
    };

    AppState {
        registry,
        snapshots,
        network,
        admin,
        shutdown: ShutdownController::default(),
    }
}

/// サーバー初期化を実行する
pub async fn initialize(config: &DirectoryConfig) -> anyhow::Result<InitContext> {
    info!("Zeta relay directory v{}", env!("CARGO_PKG_VERSION"));

    let pool = crate::db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    let registry = RelayRegistry::with_database(pool, config.health_policy)
        .await
        .context("failed to load relays from database")?;

    if let Some(path) = &config.relays_file {
        seed::apply_seed_file(&registry, path)
            .await
            .with_context(|| format!("failed to apply relay seed file {}", path.display()))?;
    }

    let state = build_state(registry.clone(), config);

    let probe = HttpProbe::new(config.probe_timeout).context("failed to create HTTP client")?;
    let prober = HealthProber::new(registry.clone(), Arc::new(probe))
        .with_interval(config.check_interval)
        .with_timeout(config.probe_timeout);

    let mut background = vec![prober.start(state.shutdown.clone())];
    if let Some(handle) = retention::spawn_retention_sweeper(
        registry,
        config.unreachable_retention,
        retention::DEFAULT_SWEEP_INTERVAL,
        state.shutdown.clone(),
    ) {
        background.push(handle);
    }

    info!(
        relay_count = state.registry.len().await,
        directory_version = state.registry.version().await,
        topic = %state.network.topic,
        "Directory initialized"
    );

    Ok(InitContext { state, background })
}
