//! データベースアクセス層
//!
//! SQLiteへの接続とマイグレーション。リレー一覧はここに永続化され、
//! 起動時にレジストリへ読み込まれる。

pub mod relays;

use crate::common::error::DirectoryResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// データベース接続プールを作成し、マイグレーションを実行
pub async fn create_pool(database_url: &str) -> DirectoryResult<SqlitePool> {
    ensure_parent_dir(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(5);
    if database_url.contains(":memory:") {
        // インメモリDBは接続ごとに別物で、最後の接続が閉じると消えるため、単一接続を維持する
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options.connect_with(connect_options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
fn ensure_parent_dir(database_url: &str) -> DirectoryResult<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    // `sqlite::memory:` のような特殊指定はスキップ
    if path.starts_with(':') {
        return Ok(());
    }
    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::common::error::DirectoryError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
