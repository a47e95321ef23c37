//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ストア層のエラーは型付きの`Result`としてAPI層へ返され、
//! API層で`status_code()`によってHTTPステータスへ変換される。
//! プローブの失敗はこの型には含まれない（`health::ProbeError`を参照）。

use crate::types::endpoint::EndpointId;
use axum::http::StatusCode;
use thiserror::Error;

/// ディレクトリサービスのエラー型
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// 不正なエンドポイント入力（URL形式不正、表示名なし等）
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// 同一IDのエンドポイントが既に存在する
    #[error("Endpoint already exists: {0}")]
    DuplicateEndpoint(EndpointId),

    /// エンドポイントが存在しない
    #[error("Endpoint not found: {0}")]
    NotFound(EndpointId),

    /// 不正なリクエスト（JSON形式不正、未知のルート等）
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 管理者資格情報がない、または一致しない
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 設定エラー（起動時のみ）
    #[error("Configuration error: {0}")]
    Config(String),

    /// 永続化エラー
    #[error("Database error: {0}")]
    Database(String),

    /// 内部エラー
    #[error("Internal error: {0}")]
    Internal(String),
}

/// ディレクトリサービスの結果型
pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        DirectoryError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DirectoryError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DirectoryError::Database(format!("Migration failed: {}", err))
    }
}

impl DirectoryError {
    /// 外部クライアント向けの安全なエラーメッセージを返す
    ///
    /// 詳細（URLやDBエラー内容）はログにのみ出力し、レスポンスには含めない。
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) => "Invalid endpoint",
            Self::DuplicateEndpoint(_) => "Endpoint already exists",
            Self::NotFound(_) => "Endpoint not found",
            Self::BadRequest(_) => "Bad request",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Config(_) => "Configuration error",
            Self::Database(_) => "Database error",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// 機械可読なエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::DuplicateEndpoint(_) => "DUPLICATE_ENDPOINT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DB_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// このエラーに対応するHTTPステータスコード
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEndpoint(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateEndpoint(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
