//! facewatch-co library interface
//!
//! Exposes the application state, router assembly, and the service modules
//! for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod queue;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::queue::JobQueue;
use crate::services::aggregator::DetectionAggregator;
use crate::services::ingestor::MediaLocks;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Job queue capability for the external detection worker
    pub queue: Arc<dyn JobQueue>,
    /// Queue name shared with the worker
    pub queue_name: String,
    /// Cross-modal detection aggregation with its memo cache
    pub aggregator: Arc<DetectionAggregator>,
    /// Per-media advisory locks for callback ingestion
    pub media_locks: MediaLocks,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, queue: Arc<dyn JobQueue>, queue_name: String) -> Self {
        let aggregator = Arc::new(DetectionAggregator::new(db.clone()));
        Self {
            db,
            queue,
            queue_name,
            aggregator,
            media_locks: MediaLocks::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::media_routes())
        .merge(api::people_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
