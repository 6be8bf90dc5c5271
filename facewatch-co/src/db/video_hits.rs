//! Video hit fact-table operations

use facewatch_common::db::{Media, VideoHit};
use facewatch_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, Transaction};

use crate::db::media::media_from_row;

/// One validated hit ready for insertion, expanded from a worker callback
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoHit {
    pub person_id: i64,
    pub frame_index: i64,
    pub timestamp_s: f64,
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub distance: Option<f64>,
}

/// A person's hits grouped per media item
#[derive(Debug, Clone)]
pub struct VideoHitGroup {
    pub media: Media,
    pub total_frames: i64,
    pub first_seen: String,
    pub last_seen: String,
}

/// Delete all fact rows for one media item (inside the ingestion transaction)
///
/// Re-ingestion is a wholesale replace: clearing first keeps a redelivered
/// callback from doubling the row count.
pub async fn delete_hits_for_media(tx: &mut Transaction<'_, Sqlite>, media_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM video_hits WHERE media_id = ?")
        .bind(media_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

/// Bulk-insert fact rows for one media item in a single statement
///
/// All rows share the one commit timestamp passed by the caller.
pub async fn insert_hits(
    tx: &mut Transaction<'_, Sqlite>,
    media_id: i64,
    hits: &[NewVideoHit],
    now: &str,
) -> Result<()> {
    if hits.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"INSERT INTO video_hits
           (media_id, person_id, frame_index, timestamp_s, "left", "top", "right", "bottom", distance, created_at, updated_at) "#,
    );

    builder.push_values(hits, |mut row, hit| {
        row.push_bind(media_id)
            .push_bind(hit.person_id)
            .push_bind(hit.frame_index)
            .push_bind(hit.timestamp_s)
            .push_bind(hit.left)
            .push_bind(hit.top)
            .push_bind(hit.right)
            .push_bind(hit.bottom)
            .push_bind(hit.distance)
            .push_bind(now)
            .push_bind(now);
    });

    builder.build().execute(&mut **tx).await?;

    Ok(())
}

/// Load all fact rows for one media item, in frame order
pub async fn load_hits_for_media(pool: &SqlitePool, media_id: i64) -> Result<Vec<VideoHit>> {
    let rows = sqlx::query(
        r#"
        SELECT id, media_id, person_id, frame_index, timestamp_s,
               "left", "top", "right", "bottom", distance, created_at, updated_at
        FROM video_hits
        WHERE media_id = ?
        ORDER BY frame_index, id
        "#,
    )
    .bind(media_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(hit_from_row).collect())
}

fn hit_from_row(row: &SqliteRow) -> VideoHit {
    VideoHit {
        id: row.get("id"),
        media_id: row.get("media_id"),
        person_id: row.get("person_id"),
        frame_index: row.get("frame_index"),
        timestamp_s: row.get("timestamp_s"),
        left: row.get("left"),
        top: row.get("top"),
        right: row.get("right"),
        bottom: row.get("bottom"),
        distance: row.get("distance"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Group a person's fact rows by media item
///
/// Count is the row count; first/last seen are the MIN/MAX row timestamps.
pub async fn hits_grouped_for_person(
    pool: &SqlitePool,
    person_id: i64,
) -> Result<Vec<VideoHitGroup>> {
    let rows = sqlx::query(
        r#"
        SELECT m.id, m.path, m.type, m.status, m.meta, m.created_at, m.updated_at,
               COUNT(vh.id) AS total_frames,
               MIN(vh.created_at) AS first_seen,
               MAX(vh.created_at) AS last_seen
        FROM video_hits vh
        JOIN media m ON m.id = vh.media_id
        WHERE vh.person_id = ?
        GROUP BY m.id
        ORDER BY last_seen DESC
        "#,
    )
    .bind(person_id)
    .fetch_all(pool)
    .await?;

    let mut groups = Vec::with_capacity(rows.len());
    for row in &rows {
        groups.push(VideoHitGroup {
            media: media_from_row(row)?,
            total_frames: row.get("total_frames"),
            first_seen: row.get("first_seen"),
            last_seen: row.get("last_seen"),
        });
    }

    Ok(groups)
}

/// Count a person's fact rows across all media
pub async fn count_hits_for_person(pool: &SqlitePool, person_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM video_hits WHERE person_id = ?")
        .bind(person_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
