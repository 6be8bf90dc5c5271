//! Job dispatch to the external detection worker

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::queue::JobQueue;

/// The wire contract shared with the worker - nothing more
///
/// `meta` is the media's current (pre-processing) value, normally null.
#[derive(Debug, Serialize)]
struct JobDescriptor<'a> {
    #[serde(rename = "type")]
    media_type: &'a str,
    media_id: i64,
    queued_at: String,
    meta: Option<&'a Value>,
}

/// Push exactly one detection job for the given media item
///
/// Fails with NotFound before sending anything if the media id is unknown.
/// The push itself is fire-and-forget.
pub async fn dispatch(
    pool: &SqlitePool,
    queue: &dyn JobQueue,
    queue_name: &str,
    media_id: i64,
) -> ApiResult<()> {
    let media = crate::db::media::load_media(pool, media_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Media {} not found", media_id)))?;

    let descriptor = JobDescriptor {
        media_type: media.media_type.as_str(),
        media_id: media.id,
        queued_at: Utc::now().to_rfc3339(),
        meta: media.meta.as_ref(),
    };

    let payload = serde_json::to_string(&descriptor)
        .map_err(|e| ApiError::Other(anyhow::anyhow!("job serialization failed: {}", e)))?;

    queue.push_raw(queue_name, &payload).await?;

    info!(
        media_id,
        media_type = media.media_type.as_str(),
        queue = queue_name,
        "Dispatched detection job"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_matches_wire_contract() {
        let descriptor = JobDescriptor {
            media_type: "photo",
            media_id: 7,
            queued_at: "2026-08-07T12:00:00+00:00".to_string(),
            meta: None,
        };
        let wire: Value = serde_json::from_str(&serde_json::to_string(&descriptor).unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": "photo",
                "media_id": 7,
                "queued_at": "2026-08-07T12:00:00+00:00",
                "meta": null
            })
        );
    }
}
