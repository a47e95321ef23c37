//! リレーエンドポイントのデータベース操作
//!
//! 各変更は`directory_meta.version`の更新と同一トランザクションで書き込む。

use crate::common::error::{DirectoryError, DirectoryResult};
use crate::types::endpoint::{EndpointId, EndpointRecord};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

const VERSION_KEY: &str = "directory_version";

#[derive(Debug, sqlx::FromRow)]
struct RelayRow {
    id: String,
    position: i64,
    name: String,
    ws_url: Option<String>,
    api_url: Option<String>,
    health: String,
    consecutive_failures: i64,
    last_checked_at: Option<String>,
    unreachable_since: Option<String>,
    registered_at: String,
}

fn parse_timestamp(value: &str) -> DirectoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DirectoryError::Database(format!("invalid timestamp '{}': {}", value, e)))
}

impl TryFrom<RelayRow> for EndpointRecord {
    type Error = DirectoryError;

    fn try_from(row: RelayRow) -> Result<Self, Self::Error> {
        Ok(EndpointRecord {
            id: EndpointId::new(row.id),
            display_name: row.name,
            websocket_url: row.ws_url,
            api_base_url: row.api_url,
            health: row.health.parse().unwrap_or_default(),
            last_checked_at: row.last_checked_at.as_deref().map(parse_timestamp).transpose()?,
            consecutive_failures: u32::try_from(row.consecutive_failures).unwrap_or(0),
            registered_at: parse_timestamp(&row.registered_at)?,
            unreachable_since: row
                .unreachable_since
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            position: u64::try_from(row.position).unwrap_or(0),
        })
    }
}

/// 永続化されたリレー一覧を挿入順で取得
pub async fn load_relays(pool: &SqlitePool) -> DirectoryResult<Vec<EndpointRecord>> {
    let rows = sqlx::query_as::<_, RelayRow>(
        r#"
        SELECT id, position, name, ws_url, api_url, health, consecutive_failures,
               last_checked_at, unreachable_since, registered_at
        FROM relays
        ORDER BY position ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(EndpointRecord::try_from).collect()
}

/// 永続化されたディレクトリバージョンを取得（未保存なら0）
pub async fn load_version(pool: &SqlitePool) -> DirectoryResult<u64> {
    let value: Option<(i64,)> = sqlx::query_as("SELECT value FROM directory_meta WHERE key = ?")
        .bind(VERSION_KEY)
        .fetch_optional(pool)
        .await?;
    Ok(value.map(|(v,)| u64::try_from(v).unwrap_or(0)).unwrap_or(0))
}

async fn store_version(tx: &mut Transaction<'_, Sqlite>, version: u64) -> DirectoryResult<()> {
    sqlx::query(
        r#"
        INSERT INTO directory_meta (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(VERSION_KEY)
    .bind(version as i64)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// リレーを登録
pub async fn insert_relay(
    pool: &SqlitePool,
    record: &EndpointRecord,
    version: u64,
) -> DirectoryResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO relays (
            id, position, name, ws_url, api_url, health, consecutive_failures,
            last_checked_at, unreachable_since, registered_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.as_str())
    .bind(record.position as i64)
    .bind(&record.display_name)
    .bind(&record.websocket_url)
    .bind(&record.api_base_url)
    .bind(record.health.as_str())
    .bind(record.consecutive_failures as i64)
    .bind(record.last_checked_at.map(|dt| dt.to_rfc3339()))
    .bind(record.unreachable_since.map(|dt| dt.to_rfc3339()))
    .bind(record.registered_at.to_rfc3339())
    .execute(&mut *tx)
    .await?;

    store_version(&mut tx, version).await?;
    tx.commit().await?;
    Ok(())
}

/// リレーのヘルス関連フィールドを更新
pub async fn update_relay_health(
    pool: &SqlitePool,
    record: &EndpointRecord,
    version: u64,
) -> DirectoryResult<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE relays SET
            health = ?, consecutive_failures = ?, last_checked_at = ?, unreachable_since = ?
        WHERE id = ?
        "#,
    )
    .bind(record.health.as_str())
    .bind(record.consecutive_failures as i64)
    .bind(record.last_checked_at.map(|dt| dt.to_rfc3339()))
    .bind(record.unreachable_since.map(|dt| dt.to_rfc3339()))
    .bind(record.id.as_str())
    .execute(&mut *tx)
    .await?;

    store_version(&mut tx, version).await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// リレーを削除
pub async fn delete_relay(pool: &SqlitePool, id: &EndpointId, version: u64) -> DirectoryResult<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM relays WHERE id = ?")
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

    store_version(&mut tx, version).await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
