//! Video side of the detection store

use async_trait::async_trait;
use facewatch_common::db::{Media, MediaType};
use facewatch_common::Result;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::video_hits;
use crate::services::detection_source::{
    DetectionKind, DetectionRecord, DetectionSource, MediaDetection,
};

/// Detections backed by the normalized `video_hits` fact table
pub struct VideoDetectionSource {
    pool: SqlitePool,
}

impl VideoDetectionSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetectionSource for VideoDetectionSource {
    async fn hits_for_person(&self, person_id: i64) -> Result<Vec<MediaDetection>> {
        let groups = video_hits::hits_grouped_for_person(&self.pool, person_id).await?;

        Ok(groups
            .into_iter()
            .map(|group| MediaDetection {
                media: group.media,
                detection_type: DetectionKind::Video,
                total_frames: group.total_frames,
                first_seen: group.first_seen,
                last_seen: group.last_seen,
            })
            .collect())
    }

    async fn detections_for_media(&self, media: &Media) -> Result<Vec<DetectionRecord>> {
        if media.media_type != MediaType::Video {
            return Ok(Vec::new());
        }

        let hits = video_hits::load_hits_for_media(&self.pool, media.id).await?;

        Ok(hits
            .into_iter()
            .map(|hit| DetectionRecord {
                person_id: Some(hit.person_id),
                name: None,
                distance: hit.distance,
                bbox: Some(json!({
                    "left": hit.left,
                    "top": hit.top,
                    "right": hit.right,
                    "bottom": hit.bottom,
                })),
                frame_index: Some(hit.frame_index),
                timestamp_s: Some(hit.timestamp_s),
            })
            .collect())
    }

    async fn count_for_person(&self, person_id: i64) -> Result<i64> {
        video_hits::count_hits_for_person(&self.pool, person_id).await
    }
}
