//! Database record types

use serde::{Deserialize, Serialize};

/// Media kind, fixed at upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "photo" => Some(MediaType::Photo),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// Media processing lifecycle state
///
/// Only ever advances: queued -> processing -> processed | failed.
/// A later terminal callback may overwrite an earlier terminal state
/// (reprocessing), but the state never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Queued,
    Processing,
    Processed,
    Failed,
}

impl MediaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Queued => "queued",
            MediaStatus::Processing => "processing",
            MediaStatus::Processed => "processed",
            MediaStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(MediaStatus::Queued),
            "processing" => Some(MediaStatus::Processing),
            "processed" => Some(MediaStatus::Processed),
            "failed" => Some(MediaStatus::Failed),
            _ => None,
        }
    }
}

/// An uploaded photo or video queued for detection
///
/// `meta` is an opaque structured blob whose shape depends on type and
/// status; it is never re-validated once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub path: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub status: MediaStatus,
    pub meta: Option<serde_json::Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// A named identity enrollable as a detection target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub thumbnail_path: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One detected-face occurrence in one video frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoHit {
    pub id: i64,
    pub media_id: i64,
    pub person_id: i64,
    pub frame_index: i64,
    pub timestamp_s: f64,
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
    pub distance: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}
