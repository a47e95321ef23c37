//! 起動時のリレーシードファイル読み込み
//!
//! YAMLで記述したリレー一覧をレジストリへ登録する。各エントリは
//! `{id?, name, ws?, api?}`形式か、旧形式のmultiaddr文字列
//! （`/dns4/<host>/tcp/<port>/wss/...`）のどちらでもよい。

use super::RelayRegistry;
use crate::common::error::{DirectoryError, DirectoryResult};
use crate::types::endpoint::NewEndpoint;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// シードファイルの1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SeedEntry {
    /// 構造化形式
    Relay {
        /// 明示ID
        #[serde(default)]
        id: Option<String>,
        /// 表示名
        name: String,
        /// WebSocket URL
        #[serde(default)]
        ws: Option<String>,
        /// APIベースURL
        #[serde(default)]
        api: Option<String>,
    },
    /// 旧形式のmultiaddr文字列
    Multiaddr(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    List(Vec<SeedEntry>),
    Wrapped { relays: Vec<SeedEntry> },
}

/// シード適用結果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// 新規登録数
    pub added: usize,
    /// 既存IDのためスキップした数
    pub skipped: usize,
    /// 不正なエントリ数
    pub invalid: usize,
}

impl SeedEntry {
    /// 登録要求へ変換
    pub fn to_new_endpoint(&self) -> DirectoryResult<NewEndpoint> {
        match self {
            SeedEntry::Relay { id, name, ws, api } => {
                let request = NewEndpoint::new(name.clone(), ws.clone(), api.clone());
                Ok(match id {
                    Some(id) => request.with_id(id.as_str()),
                    None => request,
                })
            }
            SeedEntry::Multiaddr(addr) => {
                let (host, ws_url) = multiaddr_to_websocket_url(addr)?;
                Ok(NewEndpoint::new(host, Some(ws_url), None))
            }
        }
    }
}

/// multiaddr文字列をWebSocket URLに変換し、`(host, url)`を返す
///
/// `/dns4/relay.example/tcp/443/wss/p2p-webrtc-star` → `wss://relay.example:443`
pub fn multiaddr_to_websocket_url(addr: &str) -> DirectoryResult<(String, String)> {
    let invalid = |reason: &str| {
        DirectoryError::InvalidEndpoint(format!("unsupported multiaddr '{}': {}", addr, reason))
    };

    let parts: Vec<&str> = addr.trim().split('/').collect();
    let [empty, proto, host, tcp, port, transport, ..] = parts.as_slice() else {
        return Err(invalid("expected /<proto>/<host>/tcp/<port>/<ws|wss>"));
    };
    if !empty.is_empty() || *tcp != "tcp" {
        return Err(invalid("expected /<proto>/<host>/tcp/<port>/<ws|wss>"));
    }
    let host = match *proto {
        "dns" | "dns4" | "dns6" | "ip4" => host.to_string(),
        "ip6" => format!("[{}]", host),
        other => return Err(invalid(&format!("unknown address protocol '{}'", other))),
    };
    if host.is_empty() {
        return Err(invalid("empty host"));
    }
    let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
    let scheme = match *transport {
        "ws" => "ws",
        "wss" => "wss",
        other => return Err(invalid(&format!("transport '{}' is not a websocket", other))),
    };

    Ok((host.clone(), format!("{}://{}:{}", scheme, host, port)))
}

/// YAML文字列をパース
pub fn parse_seed(content: &str) -> DirectoryResult<Vec<SeedEntry>> {
    let file: SeedFile = serde_yaml::from_str(content)
        .map_err(|e| DirectoryError::Config(format!("invalid relay seed file: {}", e)))?;
    Ok(match file {
        SeedFile::List(entries) => entries,
        SeedFile::Wrapped { relays } => relays,
    })
}

/// シードファイルを読み込んでレジストリへ適用
///
/// 既に存在するIDのエントリはスキップする。不正なエントリは警告を出して読み飛ばす。
pub async fn apply_seed_file(registry: &RelayRegistry, path: &Path) -> DirectoryResult<SeedSummary> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DirectoryError::Config(format!(
            "failed to read relay seed file {}: {}",
            path.display(),
            e
        ))
    })?;
    let entries = parse_seed(&content)?;
    let summary = apply_seed(registry, &entries).await?;

    info!(
        path = %path.display(),
        added = summary.added,
        skipped = summary.skipped,
        invalid = summary.invalid,
        "Applied relay seed file"
    );
    Ok(summary)
}

/// シードエントリをレジストリへ適用
pub async fn apply_seed(registry: &RelayRegistry, entries: &[SeedEntry]) -> DirectoryResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for entry in entries {
        let request = match entry.to_new_endpoint() {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Skipping invalid seed entry");
                summary.invalid += 1;
                continue;
            }
        };
        match registry.add_endpoint(request).await {
            Ok(_) => summary.added += 1,
            Err(DirectoryError::DuplicateEndpoint(id)) => {
                info!(relay_id = %id, "Seed relay already registered");
                summary.skipped += 1;
            }
            Err(DirectoryError::InvalidEndpoint(reason)) => {
                warn!(reason = %reason, "Skipping invalid seed entry");
                summary.invalid += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}
