//! リレーエンドポイント型定義
//!
//! ディレクトリが管理するリレーノードの接続先と、直近のヘルス状態を表す。

use crate::common::error::{DirectoryError, DirectoryResult};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 明示指定されたIDの最大長
const MAX_ID_LEN: usize = 128;

/// エンドポイントの一意識別子
///
/// オペレーターが明示指定するか、アドレスから導出される（UUID v5）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    /// 文字列からIDを作成（検証なし）
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// アドレスからIDを導出
    ///
    /// 同じURLからは常に同じIDが得られる。
    pub fn derive_from_address(address: &Url) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, address.as_str().as_bytes()).to_string())
    }

    /// 文字列として取得
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 明示指定IDとして妥当か検証
    ///
    /// パスパラメータとして使うため、英数字と`-` `_` `.`のみ許可する。
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.0.is_empty() || self.0.len() > MAX_ID_LEN {
            return Err(DirectoryError::InvalidEndpoint(format!(
                "id must be 1..={} characters",
                MAX_ID_LEN
            )));
        }
        if !self
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(DirectoryError::InvalidEndpoint(format!(
                "id '{}' contains unsupported characters",
                self.0
            )));
        }
        Ok(())
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// エンドポイントのヘルス状態
///
/// ```text
/// Unknown --(成功)--> Healthy
/// Healthy --(失敗)--> Degraded --(閾値以上の連続失敗)--> Unreachable
/// Degraded|Unreachable --(成功)--> Healthy
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointHealth {
    /// 未確認（登録直後）
    #[default]
    Unknown,
    /// 稼働中
    Healthy,
    /// 一時的な失敗あり
    Degraded,
    /// 到達不能（デフォルトのスナップショットから除外）
    Unreachable,
}

impl EndpointHealth {
    /// 文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unreachable => "unreachable",
        }
    }

    /// スナップショットでの並び順（小さいほど先頭）
    pub fn rank(&self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::Degraded => 1,
            Self::Unknown => 2,
            Self::Unreachable => 3,
        }
    }
}

impl FromStr for EndpointHealth {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "healthy" => Self::Healthy,
            "degraded" => Self::Degraded,
            "unreachable" => Self::Unreachable,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for EndpointHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 連続失敗回数からヘルス状態を決めるポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    /// Unreachableに遷移する連続失敗回数
    pub failure_threshold: u32,
}

impl HealthPolicy {
    /// デフォルトの閾値
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

    /// ポリシーを作成（閾値0は不可）
    pub fn new(failure_threshold: u32) -> DirectoryResult<Self> {
        if failure_threshold == 0 {
            return Err(DirectoryError::Config(
                "failure threshold must be at least 1".to_string(),
            ));
        }
        Ok(Self { failure_threshold })
    }

    /// 失敗後の連続失敗回数に対応するヘルス状態
    pub fn health_after_failures(&self, consecutive_failures: u32) -> EndpointHealth {
        if consecutive_failures >= self.failure_threshold {
            EndpointHealth::Unreachable
        } else {
            EndpointHealth::Degraded
        }
    }
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: Self::DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// 登録要求（検証前）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEndpoint {
    /// 明示指定ID（省略時はアドレスから導出）
    pub id: Option<EndpointId>,
    /// 表示名
    pub display_name: String,
    /// WebSocket URL（ws/wss）
    pub websocket_url: Option<String>,
    /// APIベースURL（http/https）
    pub api_base_url: Option<String>,
}

impl NewEndpoint {
    /// 登録要求を作成
    pub fn new(
        display_name: impl Into<String>,
        websocket_url: Option<String>,
        api_base_url: Option<String>,
    ) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            websocket_url,
            api_base_url,
        }
    }

    /// IDを明示指定
    pub fn with_id(mut self, id: impl Into<EndpointId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 入力を検証し、確定したIDを返す
    ///
    /// URLは少なくとも一方が正しい形式であればよい。もう一方が不正な場合は
    /// 警告を出して無視する（レコードには保存されない）。
    pub fn validate(&self) -> DirectoryResult<EndpointId> {
        if self.display_name.trim().is_empty() {
            return Err(DirectoryError::InvalidEndpoint(
                "name is required".to_string(),
            ));
        }

        let ws = non_blank(self.websocket_url.as_deref()).map(|raw| parse_url(raw, WS_SCHEMES));
        let api =
            non_blank(self.api_base_url.as_deref()).map(|raw| parse_url(raw, API_SCHEMES));

        let derived_from = match (api, ws) {
            (Some(Ok(api)), ws) => {
                if let Some(Err(e)) = ws {
                    warn_dropped_url(&self.display_name, "ws", &e);
                }
                api
            }
            (api, Some(Ok(ws))) => {
                if let Some(Err(e)) = api {
                    warn_dropped_url(&self.display_name, "api", &e);
                }
                ws
            }
            (Some(Err(e)), _) | (None, Some(Err(e))) => return Err(e),
            (None, None) => {
                return Err(DirectoryError::InvalidEndpoint(
                    "at least one of ws or api URL is required".to_string(),
                ))
            }
        };

        match &self.id {
            Some(id) => {
                id.validate()?;
                Ok(id.clone())
            }
            None => Ok(EndpointId::derive_from_address(&derived_from)),
        }
    }
}

const WS_SCHEMES: &[&str] = &["ws", "wss"];
const API_SCHEMES: &[&str] = &["http", "https"];

fn warn_dropped_url(name: &str, field: &str, error: &DirectoryError) {
    tracing::warn!(
        relay = %name.trim(),
        field = field,
        error = %error,
        "Ignoring malformed relay URL"
    );
}

/// 正しい形式のURLのみを残す
fn well_formed(value: Option<&str>, schemes: &[&str]) -> Option<String> {
    non_blank(value)
        .filter(|raw| parse_url(raw, schemes).is_ok())
        .map(String::from)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_url(raw: &str, schemes: &[&str]) -> DirectoryResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| DirectoryError::InvalidEndpoint(format!("malformed URL '{}': {}", raw, e)))?;
    if !schemes.contains(&url.scheme()) {
        return Err(DirectoryError::InvalidEndpoint(format!(
            "URL '{}' must use one of the schemes {:?}",
            raw, schemes
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(DirectoryError::InvalidEndpoint(format!(
            "URL '{}' has no host",
            raw
        )));
    }
    Ok(url)
}

/// ストアが保持するエンドポイントレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// 一意識別子
    pub id: EndpointId,
    /// 表示名（例: "EU 1"）
    pub display_name: String,
    /// WebSocket URL
    #[serde(rename = "websocketURL")]
    pub websocket_url: Option<String>,
    /// APIベースURL
    #[serde(rename = "apiBaseURL")]
    pub api_base_url: Option<String>,
    /// ヘルス状態
    pub health: EndpointHealth,
    /// 最終プローブ時刻
    pub last_checked_at: Option<DateTime<Utc>>,
    /// 連続失敗回数
    pub consecutive_failures: u32,
    /// 登録日時
    pub registered_at: DateTime<Utc>,
    /// Unreachableに遷移した時刻
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreachable_since: Option<DateTime<Utc>>,
    /// 挿入順（ストアが採番）
    #[serde(skip)]
    pub position: u64,
}

impl EndpointRecord {
    /// 検証済みの登録要求からレコードを作成
    pub fn new(id: EndpointId, request: NewEndpoint, position: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            display_name: request.display_name.trim().to_string(),
            websocket_url: well_formed(request.websocket_url.as_deref(), WS_SCHEMES),
            api_base_url: well_formed(request.api_base_url.as_deref(), API_SCHEMES),
            health: EndpointHealth::Unknown,
            last_checked_at: None,
            consecutive_failures: 0,
            registered_at: now,
            unreachable_since: None,
            position,
        }
    }

    /// プローブ成功を反映
    pub fn apply_probe_success(&mut self, at: DateTime<Utc>) {
        self.health = EndpointHealth::Healthy;
        self.consecutive_failures = 0;
        self.unreachable_since = None;
        self.last_checked_at = Some(at);
    }

    /// プローブ失敗を反映
    pub fn apply_probe_failure(&mut self, at: DateTime<Utc>, policy: &HealthPolicy) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let next = policy.health_after_failures(self.consecutive_failures);
        if next == EndpointHealth::Unreachable && self.health != EndpointHealth::Unreachable {
            self.unreachable_since = Some(at);
        }
        self.health = next;
        self.last_checked_at = Some(at);
    }
}
