//! Media API handlers
//!
//! The worker-facing surface: media lookup, job dispatch, and the result
//! callback.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use facewatch_common::db::Media;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::services::annotations::{annotations_for_media, AnnotationView};
use crate::services::{dispatcher, ingestor};
use crate::AppState;

/// POST /api/media/:id/enqueue response
#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub queued: bool,
}

/// POST /api/media/:id/processed response
#[derive(Debug, Serialize)]
pub struct ProcessedResponse {
    pub ok: bool,
    pub media: Media,
}

/// GET /api/media/:id
///
/// Full media record, used by the worker to resolve its job descriptor.
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Media>> {
    let media = crate::db::media::load_media(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Media {} not found", id)))?;

    Ok(Json(media))
}

/// POST /api/media/:id/enqueue
///
/// Push one detection job for the media item. Fire-and-forget.
pub async fn enqueue_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EnqueueResponse>> {
    dispatcher::dispatch(&state.db, state.queue.as_ref(), &state.queue_name, id).await?;
    Ok(Json(EnqueueResponse { queued: true }))
}

/// POST /api/media/:id/processed
///
/// Worker result callback. Validation failures never mutate stored state.
pub async fn media_processed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<ProcessedResponse>> {
    let media = ingestor::process_result(&state.db, &state.media_locks, id, &payload).await?;
    Ok(Json(ProcessedResponse { ok: true, media }))
}

/// GET /api/media/:id/annotations
///
/// Presented detections for one media item: normalized bboxes, sanitized
/// distances, resolved person labels.
pub async fn media_annotations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<AnnotationView>>> {
    let media = crate::db::media::load_media(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Media {} not found", id)))?;

    let annotations = annotations_for_media(&state.db, &state.aggregator, &media).await?;

    Ok(Json(annotations))
}

/// Build media routes
pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/api/media/:id", get(get_media))
        .route("/api/media/:id/enqueue", post(enqueue_media))
        .route("/api/media/:id/processed", post(media_processed))
        .route("/api/media/:id/annotations", get(media_annotations))
}
