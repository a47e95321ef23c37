//! リレーへの到達性プローブ

use crate::types::endpoint::EndpointRecord;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

/// プローブの失敗理由
///
/// ヘルス状態にのみ反映され、APIには返らない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// タイムアウト
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    /// 接続失敗や5xx応答
    #[error("probe failed: {0}")]
    Failure(String),
}

/// 何をもって到達可能とみなすか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    /// APIベースURL: 5xx以外の応答で成功
    Api,
    /// WebSocketのみのリレー: HTTP応答があれば成功
    WebSocket,
}

/// プローブ対象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// GETするURL
    pub url: Url,
    /// 判定方式
    pub kind: ProbeKind,
}

impl ProbeTarget {
    /// レコードからプローブ対象を決める（APIベースURLを優先）
    pub fn for_record(record: &EndpointRecord) -> Option<Self> {
        if let Some(url) = record
            .api_base_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
        {
            return Some(Self {
                url,
                kind: ProbeKind::Api,
            });
        }

        let mut url = record
            .websocket_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())?;
        let scheme = match url.scheme() {
            "ws" => "http",
            "wss" => "https",
            _ => return None,
        };
        url.set_scheme(scheme).ok()?;
        Some(Self {
            url,
            kind: ProbeKind::WebSocket,
        })
    }

    /// HTTPステータスから到達可否を判定
    pub fn is_reachable(&self, status: reqwest::StatusCode) -> bool {
        match self.kind {
            ProbeKind::Api => !status.is_server_error(),
            ProbeKind::WebSocket => true,
        }
    }
}

/// プローブ実装の抽象
#[async_trait]
pub trait RelayProbe: Send + Sync {
    /// 対象に1回プローブする（タイムアウトは呼び出し側で管理）
    async fn probe(&self, target: &ProbeTarget) -> Result<(), ProbeError>;
}

/// reqwestによるHTTPプローブ
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// 接続タイムアウト付きのクライアントでプローブを作成
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("zeta-directory/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RelayProbe for HttpProbe {
    async fn probe(&self, target: &ProbeTarget) -> Result<(), ProbeError> {
        let response = self
            .client
            .get(target.url.clone())
            .send()
            .await
            .map_err(|e| ProbeError::Failure(e.to_string()))?;

        let status = response.status();
        if target.is_reachable(status) {
            Ok(())
        } else {
            Err(ProbeError::Failure(format!("HTTP {}", status)))
        }
    }
}
