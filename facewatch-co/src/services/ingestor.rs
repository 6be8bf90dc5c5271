//! Worker result ingestion
//!
//! Commits one callback as one transaction: the media status/meta update
//! and any fact-row expansion either both persist or neither does, so the
//! worker can always retry a failed delivery against unchanged state.

use facewatch_common::db::{Media, MediaStatus};
use facewatch_common::time::now_rfc3339;
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

use crate::db::{media, video_hits};
use crate::error::{ApiError, ApiResult};
use crate::services::payload::{validate_callback, CallbackOutcome};

/// Advisory lock registry keyed by media id
///
/// Concurrent callbacks for the same media id are serialized; distinct ids
/// never block each other. The registry itself is only held long enough to
/// look up the per-media mutex.
#[derive(Clone, Default)]
pub struct MediaLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl MediaLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, media_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().await;
            registry
                .entry(media_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Apply a worker callback to the addressed media item
///
/// Validates before any mutation; all writes for one callback happen in a
/// single transaction. A callback for media already in a terminal state is
/// applied as a wholesale replace (worker redelivery is an idempotent
/// overwrite, never a merge).
pub async fn process_result(
    pool: &SqlitePool,
    locks: &MediaLocks,
    media_id: i64,
    payload: &Value,
) -> ApiResult<Media> {
    let _guard = locks.acquire(media_id).await;

    let media = media::load_media(pool, media_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Media {} not found", media_id)))?;

    let outcome = validate_callback(media.media_type, payload)?;

    // Existing meta keys survive; the callback only replaces its own keys.
    let mut meta = match media.meta {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let now = now_rfc3339();
    let mut tx = pool.begin().await?;

    match outcome {
        CallbackOutcome::Failed { error } => {
            let message = error.unwrap_or_else(|| "Unknown error".to_string());
            meta.insert("error".to_string(), json!(message));
            media::update_status_meta(
                &mut tx,
                media_id,
                MediaStatus::Failed,
                &Value::Object(meta),
                &now,
            )
            .await?;

            tx.commit().await?;
            info!(media_id, "Media marked failed by worker");
        }
        CallbackOutcome::PhotoProcessed { detections } => {
            let count = detections.len();
            meta.insert("detections".to_string(), Value::Array(detections));
            media::update_status_meta(
                &mut tx,
                media_id,
                MediaStatus::Processed,
                &Value::Object(meta),
                &now,
            )
            .await?;

            tx.commit().await?;
            info!(media_id, detections = count, "Photo detections ingested");
        }
        CallbackOutcome::VideoProcessed {
            fps,
            frame_skip,
            hits,
            raw_hits,
        } => {
            meta.insert("fps".to_string(), json!(fps));
            meta.insert("frame_skip".to_string(), json!(frame_skip));
            meta.insert("hits".to_string(), raw_hits);

            let replaced = video_hits::delete_hits_for_media(&mut tx, media_id).await?;
            video_hits::insert_hits(&mut tx, media_id, &hits, &now).await?;
            media::update_status_meta(
                &mut tx,
                media_id,
                MediaStatus::Processed,
                &Value::Object(meta),
                &now,
            )
            .await?;

            tx.commit().await?;
            info!(
                media_id,
                hits = hits.len(),
                replaced,
                "Video hits ingested"
            );
        }
    }

    media::load_media(pool, media_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Media {} not found", media_id)))
}
