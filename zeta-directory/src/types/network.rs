//! ネットワークパラメータ
//!
//! クライアントがメッシュに参加するために必要な、デプロイ単位で不変の値。

use crate::common::error::{DirectoryError, DirectoryResult};
use serde::Serialize;

/// デフォルトのpub/subトピック
pub const DEFAULT_TOPIC: &str = "/zeta2/social/v1";

/// デフォルトのプロトコルバージョン
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.0.0";

/// デフォルトの最大メッセージ長
pub const DEFAULT_MAX_MESSAGE_LENGTH: u32 = 280;

/// ネットワークパラメータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkParameters {
    /// pub/subチャネル名
    pub topic: String,
    /// プロトコルバージョン（セマンティックバージョン）
    pub protocol_version: String,
    /// 投稿の最大文字数
    pub max_message_length: u32,
}

impl NetworkParameters {
    /// 値を検証してパラメータを作成
    pub fn new(
        topic: impl Into<String>,
        protocol_version: impl Into<String>,
        max_message_length: u32,
    ) -> DirectoryResult<Self> {
        let topic = topic.into();
        let protocol_version = protocol_version.into();

        if topic.trim().is_empty() {
            return Err(DirectoryError::Config("topic must not be empty".to_string()));
        }
        semver::Version::parse(&protocol_version).map_err(|e| {
            DirectoryError::Config(format!(
                "protocol version '{}' is not a semantic version: {}",
                protocol_version, e
            ))
        })?;
        if max_message_length == 0 {
            return Err(DirectoryError::Config(
                "max message length must be positive".to_string(),
            ));
        }

        Ok(Self {
            topic,
            protocol_version,
            max_message_length,
        })
    }
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}
