//! Presented annotations for one media item
//!
//! Shapes stored detections for display: resolves person labels, drops
//! detections whose person id no longer resolves, and normalizes bboxes
//! and distances. Dropping happens in the presented output only - stored
//! detections are untouched. Detections are read through the
//! DetectionSource capability, never from the physical shape directly.

use facewatch_common::db::{Media, Person};
use facewatch_common::Result;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::db::people;
use crate::services::aggregator::DetectionAggregator;
use crate::services::normalizer::{
    display_label, normalize_bbox, normalize_distance, BboxUnit, BboxView,
};

/// One presented detection
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationView {
    pub person_id: i64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    pub bbox: BboxView,
    pub unit: BboxUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_s: Option<f64>,
}

/// Presented annotations for the given media item
pub async fn annotations_for_media(
    pool: &SqlitePool,
    aggregator: &DetectionAggregator,
    media: &Media,
) -> Result<Vec<AnnotationView>> {
    let register: HashMap<i64, Person> = people::load_people(pool)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    // Image dimensions are resolvable only when the worker recorded them
    let dims = |key: &str| -> Option<f64> {
        media
            .meta
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_f64)
            .filter(|v| *v > 0.0)
    };
    let width = dims("width");
    let height = dims("height");

    let records = aggregator.detections_for_media(media).await?;

    Ok(records
        .into_iter()
        .filter_map(|record| {
            // A detection without a resolvable person is dropped from output
            let person_id = record.person_id?;
            let person = register.get(&person_id)?;

            // Prefer the enrolled name; fall back to what the worker saw
            let name = if person.name.trim().is_empty() {
                record.name.as_deref()
            } else {
                Some(person.name.as_str())
            };

            let (bbox, unit) = normalize_bbox(record.bbox.as_ref(), width, height);
            Some(AnnotationView {
                person_id,
                label: display_label(person_id, name),
                distance: normalize_distance(record.distance),
                bbox,
                unit,
                frame_index: record.frame_index,
                timestamp_s: record.timestamp_s,
            })
        })
        .collect())
}
