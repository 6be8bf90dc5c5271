//! Detection store abstraction
//!
//! "Person X was detected in media Y" exists in two physical shapes: fact
//! rows for video and an embedded JSON array for photos. Both are exposed
//! through one capability - list by person and list by media - so nothing
//! downstream depends on the shape.

use async_trait::async_trait;
use facewatch_common::db::Media;
use facewatch_common::Result;
use serde::Serialize;
use serde_json::Value;

/// Which physical shape a detection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionKind {
    Video,
    Photo,
}

/// A person's detections within one media item (list-by-person shape)
#[derive(Debug, Clone, Serialize)]
pub struct MediaDetection {
    pub media: Media,
    pub detection_type: DetectionKind,
    /// Occurrence count: fact rows for video, 1 for a photo
    pub total_frames: i64,
    pub first_seen: String,
    pub last_seen: String,
}

/// One stored detection within one media item (list-by-media shape)
///
/// Field optionality mirrors the storage: photo items may lack any field,
/// video fact rows always carry person, bbox, and frame position.
#[derive(Debug, Clone)]
pub struct DetectionRecord {
    pub person_id: Option<i64>,
    pub name: Option<String>,
    pub distance: Option<f64>,
    /// Stored bbox, absolute pixels
    pub bbox: Option<Value>,
    pub frame_index: Option<i64>,
    pub timestamp_s: Option<f64>,
}

/// One physical representation of the detection store
#[async_trait]
pub trait DetectionSource: Send + Sync {
    /// All media items in which the person was detected
    async fn hits_for_person(&self, person_id: i64) -> Result<Vec<MediaDetection>>;

    /// All detections stored for one media item; empty when the item's
    /// type belongs to another source
    async fn detections_for_media(&self, media: &Media) -> Result<Vec<DetectionRecord>>;

    /// Total detection count for the person across this source
    async fn count_for_person(&self, person_id: i64) -> Result<i64>;
}
