//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::DirectoryError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

/// エラーレスポンスボディ
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 外部向けメッセージ
    pub error: String,
    /// エラーコード
    pub code: String,
}

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub DirectoryError);

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(DirectoryError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(DirectoryError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        // 詳細はログにのみ出力し、レスポンスには固定メッセージを返す
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            debug!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorResponse {
            error: self.0.external_message().to_string(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
