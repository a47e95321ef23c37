//! 管理API認証
//!
//! `Authorization: Bearer <token>`を設定済みの管理トークンとSHA-256ダイジェストで照合する。

use super::error::AppError;
use crate::common::error::DirectoryError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

/// 管理トークンの照合設定
#[derive(Clone, Debug, Default)]
pub struct AdminAuth {
    token_digest: Option<[u8; 32]>,
    disabled: bool,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl AdminAuth {
    /// 管理トークンを指定して作成（空文字列は未設定扱い）
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token_digest: token.filter(|t| !t.is_empty()).map(digest),
            disabled: false,
        }
    }

    /// 認証を無効化（開発用）
    pub fn disabled() -> Self {
        Self {
            token_digest: None,
            disabled: true,
        }
    }

    /// 認証が無効化されているか
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// 管理トークンが設定されているか
    pub fn is_configured(&self) -> bool {
        self.token_digest.is_some()
    }

    /// Authorizationヘッダーの値を検証
    pub fn verify(&self, authorization: Option<&str>) -> Result<(), DirectoryError> {
        if self.disabled {
            return Ok(());
        }
        let Some(expected) = &self.token_digest else {
            return Err(DirectoryError::Unauthorized(
                "no admin token configured".to_string(),
            ));
        };
        let token = authorization
            .ok_or_else(|| DirectoryError::Unauthorized("missing Authorization header".to_string()))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                DirectoryError::Unauthorized("invalid Authorization header format".to_string())
            })?;

        let actual = digest(token.trim());
        let mismatch = expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if mismatch == 0 {
            Ok(())
        } else {
            Err(DirectoryError::Unauthorized("admin token mismatch".to_string()))
        }
    }
}

/// 管理API用の認証ミドルウェア
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Err(e) = state.admin.verify(authorization) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %e,
            "Rejected admin request"
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
