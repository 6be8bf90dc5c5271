//! Media database operations

use facewatch_common::db::{Media, MediaStatus, MediaType};
use facewatch_common::time::now_rfc3339;
use facewatch_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::warn;

/// Build a `Media` record from a row selected with `media_columns()`
///
/// The meta blob is opaque once persisted: a blob that no longer parses is
/// surfaced as `None` (and logged) instead of failing the whole query.
pub fn media_from_row(row: &SqliteRow) -> Result<Media> {
    let id: i64 = row.get("id");

    let type_str: String = row.get("type");
    let media_type = MediaType::parse(&type_str)
        .ok_or_else(|| Error::Internal(format!("Unknown media type: {}", type_str)))?;

    let status_str: String = row.get("status");
    let status = MediaStatus::parse(&status_str)
        .ok_or_else(|| Error::Internal(format!("Unknown media status: {}", status_str)))?;

    let meta: Option<String> = row.get("meta");
    let meta = meta.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(media_id = id, error = %e, "Discarding unparseable media meta");
            None
        }
    });

    Ok(Media {
        id,
        path: row.get("path"),
        media_type,
        status,
        meta,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Column list matching `media_from_row`
pub const MEDIA_COLUMNS: &str = "id, path, type, status, meta, created_at, updated_at";

/// Insert a new media record in `queued` state
pub async fn insert_media(pool: &SqlitePool, path: &str, media_type: MediaType) -> Result<Media> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO media (path, type, status, meta, created_at, updated_at)
        VALUES (?, ?, 'queued', NULL, ?, ?)
        "#,
    )
    .bind(path)
    .bind(media_type.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    load_media(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Media {} vanished after insert", id)))
}

/// Load media by id
pub async fn load_media(pool: &SqlitePool, id: i64) -> Result<Option<Media>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM media WHERE id = ?",
        MEDIA_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(media_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Load all processed photo media that carry a meta blob
///
/// This is the photo side of the detection store: embedded detections have
/// no secondary index, so listing them is always a scan over processed
/// photos.
pub async fn load_processed_photos(pool: &SqlitePool) -> Result<Vec<Media>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM media
        WHERE type = 'photo' AND status = 'processed' AND meta IS NOT NULL
        ORDER BY id
        "#,
        MEDIA_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(media_from_row).collect()
}

/// Update media status and meta inside an ingestion transaction
pub async fn update_status_meta(
    tx: &mut Transaction<'_, Sqlite>,
    id: i64,
    status: MediaStatus,
    meta: &serde_json::Value,
    now: &str,
) -> Result<()> {
    sqlx::query("UPDATE media SET status = ?, meta = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(meta.to_string())
        .bind(now)
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
