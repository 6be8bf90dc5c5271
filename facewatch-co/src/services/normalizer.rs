//! Presented-output normalization
//!
//! The read path converts stored pixel bboxes into percentage coordinates
//! when image dimensions are resolvable, sanitizes distance scores, and
//! shapes person labels. Normalization only affects presented output;
//! stored detections are never rewritten.

use serde::Serialize;
use serde_json::Value;

/// Worst-case distance score; non-finite scores collapse to this
pub const DISTANCE_WORST: f64 = 1.0;

/// Upper bound for finite distances. Euclidean distance between unit-norm
/// face embeddings cannot exceed 2.0.
pub const DISTANCE_MAX: f64 = 2.0;

/// Bounding box in presented coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BboxView {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Coordinate unit of a presented bbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BboxUnit {
    /// Percentage of image width/height
    Percent,
    /// Absolute pixels, passed through because dimensions were unknown
    Pixel,
}

/// Convert a stored bbox to presented coordinates
///
/// With resolvable dimensions, left/right become percentages of the width
/// and top/bottom percentages of the height; otherwise pixel values pass
/// through unchanged. Missing fields default to 0 before conversion.
pub fn normalize_bbox(
    bbox: Option<&Value>,
    image_width: Option<f64>,
    image_height: Option<f64>,
) -> (BboxView, BboxUnit) {
    let side = |name: &str| -> f64 {
        bbox.and_then(|b| b.get(name))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };

    let view = BboxView {
        left: side("left"),
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
    };

    match (image_width, image_height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => (
            BboxView {
                left: view.left / w * 100.0,
                top: view.top / h * 100.0,
                right: view.right / w * 100.0,
                bottom: view.bottom / h * 100.0,
            },
            BboxUnit::Percent,
        ),
        _ => (view, BboxUnit::Pixel),
    }
}

/// Sanitize a distance score for presentation
///
/// Non-finite scores (the worker emits +inf for "no usable comparison")
/// clamp to 1.0; finite scores clamp into [0, 2] and otherwise pass
/// through.
pub fn normalize_distance(distance: Option<f64>) -> Option<f64> {
    distance.map(|d| {
        if !d.is_finite() {
            DISTANCE_WORST
        } else {
            d.clamp(0.0, DISTANCE_MAX)
        }
    })
}

/// Display label for a resolved person
///
/// Falls back to a synthesized label when no usable name exists.
pub fn display_label(person_id: i64, name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => format!("Person #{}", person_id),
    }
}
