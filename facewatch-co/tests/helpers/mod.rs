//! Shared test utilities

use async_trait::async_trait;
use facewatch_common::Result;
use facewatch_co::queue::JobQueue;
use facewatch_co::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Mutex;

/// Create temporary test database with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for the
/// duration of the test.
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let pool = facewatch_common::db::init_database(&temp_dir.path().join("test_facewatch.db"))
        .await
        .unwrap();
    (temp_dir, pool)
}

/// Job queue fake that records every pushed message
#[derive(Default)]
pub struct RecordingQueue {
    pub messages: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn push_raw(&self, queue: &str, payload: &str) -> Result<()> {
        self.messages
            .lock()
            .await
            .push((queue.to_string(), payload.to_string()));
        Ok(())
    }
}

/// Application state over a test database and a recording queue
pub fn test_state(pool: SqlitePool) -> (AppState, Arc<RecordingQueue>) {
    let queue = Arc::new(RecordingQueue::default());
    let state = AppState::new(pool, queue.clone(), "face".to_string());
    (state, queue)
}

/// Insert a media row with explicit status/meta/timestamps
pub async fn insert_media_raw(
    pool: &SqlitePool,
    path: &str,
    media_type: &str,
    status: &str,
    meta: Option<&str>,
    created_at: &str,
    updated_at: &str,
) -> i64 {
    let result = sqlx::query(
        "INSERT INTO media (path, type, status, meta, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(path)
    .bind(media_type)
    .bind(status)
    .bind(meta)
    .bind(created_at)
    .bind(updated_at)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}

/// Insert a video hit row with an explicit timestamp
pub async fn insert_hit_raw(
    pool: &SqlitePool,
    media_id: i64,
    person_id: i64,
    frame_index: i64,
    timestamp_s: f64,
    created_at: &str,
) -> i64 {
    let result = sqlx::query(
        r#"
        INSERT INTO video_hits
            (media_id, person_id, frame_index, timestamp_s, "left", "top", "right", "bottom", distance, created_at, updated_at)
        VALUES (?, ?, ?, ?, 10, 20, 110, 120, 0.4, ?, ?)
        "#,
    )
    .bind(media_id)
    .bind(person_id)
    .bind(frame_index)
    .bind(timestamp_s)
    .bind(created_at)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}
