//! ロギング初期化
//!
//! 標準出力へのfmtレイヤーに加え、`ZETA_LOG_DIR`が設定されていれば
//! 日次ローテーションのファイル出力も行う。

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名の接頭辞
const LOG_FILE_PREFIX: &str = "zeta-directory.log";

/// ロギング設定
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// フィルタ指定（`info`、`zeta_directory=debug`など）。未指定なら`RUST_LOG`
    pub level: Option<String>,
    /// ログファイル出力先ディレクトリ
    pub dir: Option<PathBuf>,
}

impl LogSettings {
    /// 環境変数から読み込む
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("ZETA_LOG_LEVEL").ok().filter(|v| !v.trim().is_empty()),
            dir: std::env::var("ZETA_LOG_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    fn filter(&self) -> EnvFilter {
        match &self.level {
            Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        }
    }
}

/// グローバルなtracing subscriberを初期化
///
/// ファイル出力時は返された`WorkerGuard`をプロセス終了まで保持すること。
pub fn init(settings: &LogSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry()
        .with(settings.filter())
        .with(fmt::layer().with_target(true));

    match &settings.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            registry.try_init()?;
            Ok(None)
        }
    }
}
