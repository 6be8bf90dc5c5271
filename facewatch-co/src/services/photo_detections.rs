//! Photo side of the detection store
//!
//! Photo detections live embedded in `media.meta` with no secondary index,
//! so every person lookup is a scan over processed photos. That cost is a
//! deliberate trade-off of the embedded representation.

use async_trait::async_trait;
use facewatch_common::db::{Media, MediaType};
use facewatch_common::Result;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::media;
use crate::services::detection_source::{
    DetectionKind, DetectionRecord, DetectionSource, MediaDetection,
};

/// Detections embedded in processed photo meta blobs
pub struct PhotoDetectionSource {
    pool: SqlitePool,
}

impl PhotoDetectionSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Embedded detection items of one media record
///
/// Anything that does not look like a detections array counts as "no
/// detections" for that one row; a single bad blob never aborts a scan.
fn embedded_detections(meta: Option<&Value>) -> &[Value] {
    meta.and_then(|m| m.get("detections"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn mentions_person(meta: Option<&Value>, person_id: i64) -> bool {
    embedded_detections(meta)
        .iter()
        .any(|d| d.get("person_id").and_then(Value::as_i64) == Some(person_id))
}

fn to_media_detection(media: Media) -> MediaDetection {
    MediaDetection {
        detection_type: DetectionKind::Photo,
        total_frames: 1,
        first_seen: media.created_at.clone(),
        last_seen: media.updated_at.clone(),
        media,
    }
}

#[async_trait]
impl DetectionSource for PhotoDetectionSource {
    async fn hits_for_person(&self, person_id: i64) -> Result<Vec<MediaDetection>> {
        let photos = media::load_processed_photos(&self.pool).await?;

        Ok(photos
            .into_iter()
            .filter(|m| mentions_person(m.meta.as_ref(), person_id))
            .map(to_media_detection)
            .collect())
    }

    async fn detections_for_media(&self, media: &Media) -> Result<Vec<DetectionRecord>> {
        if media.media_type != MediaType::Photo {
            return Ok(Vec::new());
        }

        Ok(embedded_detections(media.meta.as_ref())
            .iter()
            .map(|item| DetectionRecord {
                person_id: item.get("person_id").and_then(Value::as_i64),
                name: item
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
                distance: item.get("distance").and_then(Value::as_f64),
                bbox: item.get("bbox").cloned(),
                frame_index: None,
                timestamp_s: None,
            })
            .collect())
    }

    async fn count_for_person(&self, person_id: i64) -> Result<i64> {
        Ok(self.hits_for_person(person_id).await?.len() as i64)
    }
}
