//! Worker callback payload validation
//!
//! The detection worker is a foreign producer: its callback body is
//! validated structurally here, before any domain logic runs, and every
//! failure names the offending field path (`hits.3.match.bbox.left`).
//! Photo and video payloads are deliberately asymmetric - every per-item
//! field is optional for photos, while video hits are fully required.

use facewatch_common::db::MediaType;
use serde_json::{Map, Value};

use crate::db::video_hits::NewVideoHit;
use crate::error::ApiError;

/// A validation failure with the offending field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation {
            field: e.field,
            message: e.message,
        }
    }
}

/// A validated callback, discriminated by status and media type
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// Worker failed; `error` is merged into the media meta
    Failed { error: Option<String> },
    /// Photo result: detections replace `meta.detections` wholesale.
    /// Items are kept verbatim (unknown keys preserved) - the meta blob is
    /// opaque once persisted.
    PhotoProcessed { detections: Vec<Value> },
    /// Video result: hits are expanded into fact rows and the raw payload
    /// keys replace `meta.fps`/`meta.frame_skip`/`meta.hits` as an audit
    /// copy.
    VideoProcessed {
        fps: f64,
        frame_skip: i64,
        hits: Vec<NewVideoHit>,
        raw_hits: Value,
    },
}

/// Validate a worker callback against the media type it addresses
pub fn validate_callback(
    media_type: MediaType,
    payload: &Value,
) -> Result<CallbackOutcome, ValidationError> {
    let body = payload
        .as_object()
        .ok_or_else(|| ValidationError::new("payload", "must be a JSON object"))?;

    let status = require_string(body, "status")?;
    match status {
        "failed" => {
            let error = optional_string(body, "error")?;
            Ok(CallbackOutcome::Failed { error })
        }
        "processed" => match media_type {
            MediaType::Photo => validate_photo(body),
            MediaType::Video => validate_video(body),
        },
        other => Err(ValidationError::new(
            "status",
            format!("must be 'processed' or 'failed', got '{}'", other),
        )),
    }
}

fn validate_photo(body: &Map<String, Value>) -> Result<CallbackOutcome, ValidationError> {
    let detections = require_array(body, "detections")?;

    for (i, item) in detections.iter().enumerate() {
        let path = format!("detections.{}", i);
        let obj = item
            .as_object()
            .ok_or_else(|| ValidationError::new(&path, "must be an object"))?;

        // Every field is optional per item; present fields are type-checked.
        optional_int(obj, &path, "person_id")?;
        optional_str_field(obj, &path, "name")?;
        optional_number(obj, &path, "distance")?;
        if let Some(bbox) = present(obj, "bbox") {
            let bbox_path = format!("{}.bbox", path);
            let bbox = bbox
                .as_object()
                .ok_or_else(|| ValidationError::new(&bbox_path, "must be an object"))?;
            for side in ["top", "right", "bottom", "left"] {
                require_int(bbox, &bbox_path, side)?;
            }
        }
    }

    Ok(CallbackOutcome::PhotoProcessed {
        detections: detections.to_vec(),
    })
}

fn validate_video(body: &Map<String, Value>) -> Result<CallbackOutcome, ValidationError> {
    let fps = require_number_at(body, "fps")?;
    if fps <= 0.0 {
        return Err(ValidationError::new("fps", "must be greater than 0"));
    }

    let frame_skip = require_int_at(body, "frame_skip")?;
    if frame_skip < 0 {
        return Err(ValidationError::new("frame_skip", "must be 0 or greater"));
    }

    let raw_hits = require_array(body, "hits")?;
    let mut hits = Vec::with_capacity(raw_hits.len());
    let mut prev_frame = -1i64;

    for (i, item) in raw_hits.iter().enumerate() {
        let path = format!("hits.{}", i);
        let obj = item
            .as_object()
            .ok_or_else(|| ValidationError::new(&path, "must be an object"))?;

        let frame_index = require_int(obj, &path, "frame_index")?;
        if frame_index < 0 {
            return Err(ValidationError::new(
                format!("{}.frame_index", path),
                "must be 0 or greater",
            ));
        }
        if frame_index < prev_frame {
            return Err(ValidationError::new(
                format!("{}.frame_index", path),
                "must not decrease within a callback",
            ));
        }
        prev_frame = frame_index;

        let timestamp_s = require_number(obj, &path, "timestamp_s")?;
        if timestamp_s < 0.0 {
            return Err(ValidationError::new(
                format!("{}.timestamp_s", path),
                "must be 0 or greater",
            ));
        }

        let match_path = format!("{}.match", path);
        let matched = present(obj, "match")
            .ok_or_else(|| ValidationError::new(&match_path, "is required"))?
            .as_object()
            .ok_or_else(|| ValidationError::new(&match_path, "must be an object"))?;

        let person_id = require_int(matched, &match_path, "person_id")?;
        let distance = optional_number(matched, &match_path, "distance")?;

        let bbox_path = format!("{}.bbox", match_path);
        let bbox = present(matched, "bbox")
            .ok_or_else(|| ValidationError::new(&bbox_path, "is required"))?
            .as_object()
            .ok_or_else(|| ValidationError::new(&bbox_path, "must be an object"))?;

        let mut sides = [0i64; 4];
        for (slot, side) in sides.iter_mut().zip(["top", "right", "bottom", "left"]) {
            let v = require_int(bbox, &bbox_path, side)?;
            if v < 0 {
                return Err(ValidationError::new(
                    format!("{}.{}", bbox_path, side),
                    "must be 0 or greater",
                ));
            }
            *slot = v;
        }

        hits.push(NewVideoHit {
            person_id,
            frame_index,
            // Fact rows carry seconds at 3-decimal precision
            timestamp_s: (timestamp_s * 1000.0).round() / 1000.0,
            top: sides[0],
            right: sides[1],
            bottom: sides[2],
            left: sides[3],
            distance,
        });
    }

    Ok(CallbackOutcome::VideoProcessed {
        fps,
        frame_skip,
        hits,
        raw_hits: Value::Array(raw_hits.to_vec()),
    })
}

/// A present, non-null field
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn require_string<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ValidationError> {
    present(obj, key)
        .ok_or_else(|| ValidationError::new(key, "is required"))?
        .as_str()
        .ok_or_else(|| ValidationError::new(key, "must be a string"))
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    match present(obj, key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ValidationError::new(key, "must be a string")),
    }
}

fn require_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match present(obj, key) {
        None => Err(ValidationError::new(key, "is required")),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(ValidationError::new(key, "must be an array")),
    }
}

fn as_int(v: &Value) -> Option<i64> {
    v.as_i64()
}

fn require_int_at(obj: &Map<String, Value>, key: &str) -> Result<i64, ValidationError> {
    present(obj, key)
        .ok_or_else(|| ValidationError::new(key, "is required"))
        .and_then(|v| as_int(v).ok_or_else(|| ValidationError::new(key, "must be an integer")))
}

fn require_number_at(obj: &Map<String, Value>, key: &str) -> Result<f64, ValidationError> {
    present(obj, key)
        .ok_or_else(|| ValidationError::new(key, "is required"))
        .and_then(|v| v.as_f64().ok_or_else(|| ValidationError::new(key, "must be a number")))
}

fn require_int(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<i64, ValidationError> {
    let path = format!("{}.{}", parent, key);
    present(obj, key)
        .ok_or_else(|| ValidationError::new(&path, "is required"))
        .and_then(|v| as_int(v).ok_or_else(|| ValidationError::new(&path, "must be an integer")))
}

fn require_number(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<f64, ValidationError> {
    let path = format!("{}.{}", parent, key);
    present(obj, key)
        .ok_or_else(|| ValidationError::new(&path, "is required"))
        .and_then(|v| v.as_f64().ok_or_else(|| ValidationError::new(&path, "must be a number")))
}

fn optional_int(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<Option<i64>, ValidationError> {
    match present(obj, key) {
        None => Ok(None),
        Some(v) => as_int(v).map(Some).ok_or_else(|| {
            ValidationError::new(format!("{}.{}", parent, key), "must be an integer")
        }),
    }
}

fn optional_number(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<Option<f64>, ValidationError> {
    match present(obj, key) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
            ValidationError::new(format!("{}.{}", parent, key), "must be a number")
        }),
    }
}

fn optional_str_field(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    match present(obj, key) {
        None => Ok(None),
        Some(v) => v.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
            ValidationError::new(format!("{}.{}", parent, key), "must be a string")
        }),
    }
}
