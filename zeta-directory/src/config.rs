//! Configuration management via environment variables
//!
//! Helpers read the `ZETA_*` name first and fall back to the deprecated
//! name with a warning. `DirectoryConfig::from_env` rejects malformed values.

use crate::common::error::{DirectoryError, DirectoryResult};
use crate::types::endpoint::HealthPolicy;
use crate::types::network::{
    NetworkParameters, DEFAULT_MAX_MESSAGE_LENGTH, DEFAULT_PROTOCOL_VERSION, DEFAULT_TOPIC,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use zeta_directory::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("ZETA_PORT", "DIRECTORY_PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if old_name != new_name {
        if let Ok(val) = std::env::var(old_name) {
            tracing::warn!(
                "Environment variable '{}' is deprecated, use '{}' instead",
                old_name,
                new_name
            );
            return Some(val);
        }
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` when neither variable is set, and a `Config` error when
/// the value is present but cannot be parsed.
pub fn get_env_with_fallback_parse<T>(new_name: &str, old_name: &str, default: T) -> DirectoryResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_with_fallback(new_name, old_name) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            DirectoryError::Config(format!("invalid value '{}' for {}: {}", raw, new_name, e))
        }),
        None => Ok(default),
    }
}

/// Parse a boolean flag (`true/1/yes/on`, `false/0/no/off`)
pub fn get_env_flag(new_name: &str, old_name: &str) -> DirectoryResult<bool> {
    match get_env_with_fallback(new_name, old_name) {
        None => Ok(false),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "" | "0" | "false" | "no" | "off" => Ok(false),
            other => Err(DirectoryError::Config(format!(
                "invalid boolean '{}' for {}",
                other, new_name
            ))),
        },
    }
}

/// ディレクトリサーバー設定
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// 待ち受けホスト
    pub host: String,
    /// 待ち受けポート
    pub port: u16,
    /// SQLite接続URL
    pub database_url: String,
    /// ヘルスチェック間隔
    pub check_interval: Duration,
    /// プローブタイムアウト
    pub probe_timeout: Duration,
    /// ヘルス判定ポリシー
    pub health_policy: HealthPolicy,
    /// スナップショットキャッシュのTTL
    pub snapshot_ttl: Duration,
    /// デフォルトのスナップショットにUnreachableを含めるか
    pub include_unreachable: bool,
    /// Unreachableのリレーを保持する期間（0で無期限）
    pub unreachable_retention: Duration,
    /// ネットワークパラメータ
    pub network: NetworkParameters,
    /// 管理トークン
    pub admin_token: Option<String>,
    /// 管理APIの認証を無効化
    pub auth_disabled: bool,
    /// 起動時に読み込むリレーシードファイル
    pub relays_file: Option<PathBuf>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: "sqlite://zeta-directory.db".to_string(),
            check_interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            health_policy: HealthPolicy::default(),
            snapshot_ttl: Duration::from_secs(5),
            include_unreachable: false,
            unreachable_retention: Duration::from_secs(86_400),
            network: NetworkParameters::default(),
            admin_token: None,
            auth_disabled: false,
            relays_file: None,
        }
    }
}

impl DirectoryConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> DirectoryResult<Self> {
        let check_interval_secs = get_env_with_fallback_parse(
            "ZETA_HEALTH_CHECK_INTERVAL_SECS",
            "HEALTH_CHECK_INTERVAL",
            30u64,
        )?;
        if check_interval_secs == 0 {
            return Err(DirectoryError::Config(
                "health check interval must be positive".to_string(),
            ));
        }
        let probe_timeout_secs =
            get_env_with_fallback_parse("ZETA_PROBE_TIMEOUT_SECS", "PROBE_TIMEOUT", 5u64)?;
        if probe_timeout_secs == 0 {
            return Err(DirectoryError::Config(
                "probe timeout must be positive".to_string(),
            ));
        }
        let failure_threshold = get_env_with_fallback_parse(
            "ZETA_FAILURE_THRESHOLD",
            "FAILURE_THRESHOLD",
            HealthPolicy::DEFAULT_FAILURE_THRESHOLD,
        )?;

        let network = NetworkParameters::new(
            get_env_with_fallback_or("ZETA_TOPIC", "ZETA_TOPIC", DEFAULT_TOPIC),
            get_env_with_fallback_or(
                "ZETA_PROTOCOL_VERSION",
                "ZETA_PROTOCOL_VERSION",
                DEFAULT_PROTOCOL_VERSION,
            ),
            get_env_with_fallback_parse(
                "ZETA_MAX_MESSAGE_LENGTH",
                "ZETA_MAX_MESSAGE_LENGTH",
                DEFAULT_MAX_MESSAGE_LENGTH,
            )?,
        )?;

        Ok(Self {
            host: get_env_with_fallback_or("ZETA_HOST", "DIRECTORY_HOST", "0.0.0.0"),
            port: get_env_with_fallback_parse("ZETA_PORT", "DIRECTORY_PORT", 5000u16)?,
            database_url: get_env_with_fallback_or(
                "ZETA_DATABASE_URL",
                "DATABASE_URL",
                "sqlite://zeta-directory.db",
            ),
            check_interval: Duration::from_secs(check_interval_secs),
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            health_policy: HealthPolicy::new(failure_threshold)?,
            snapshot_ttl: Duration::from_secs(get_env_with_fallback_parse(
                "ZETA_SNAPSHOT_TTL_SECS",
                "SNAPSHOT_TTL",
                5u64,
            )?),
            include_unreachable: get_env_flag("ZETA_INCLUDE_UNREACHABLE", "ZETA_INCLUDE_UNREACHABLE")?,
            unreachable_retention: Duration::from_secs(get_env_with_fallback_parse(
                "ZETA_UNREACHABLE_RETENTION_SECS",
                "ZETA_UNREACHABLE_RETENTION_SECS",
                86_400u64,
            )?),
            network,
            admin_token: get_env_with_fallback("ZETA_ADMIN_TOKEN", "ADMIN_TOKEN")
                .filter(|t| !t.trim().is_empty()),
            auth_disabled: get_env_flag("ZETA_AUTH_DISABLED", "AUTH_DISABLED")?,
            relays_file: get_env_with_fallback("ZETA_RELAYS_FILE", "ZETA_RELAYS_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
