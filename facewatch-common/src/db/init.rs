//! Database initialization
//!
//! Opens (or creates) the SQLite database and applies the schema
//! idempotently so the service starts with zero manual setup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while a writer commits, which keeps the
    // aggregation read path responsive during callback ingestion.
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_media_table(&pool).await?;
    create_people_table(&pool).await?;
    create_video_hits_table(&pool).await?;

    Ok(pool)
}

async fn create_media_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('photo', 'video')),
            status TEXT NOT NULL DEFAULT 'queued',
            meta TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_status ON media(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_type ON media(type)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_people_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS people (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            thumbnail_path TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_video_hits_table(pool: &SqlitePool) -> Result<()> {
    // "left" and "right" are SQL keywords; quoted throughout.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS video_hits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            media_id INTEGER NOT NULL REFERENCES media(id) ON DELETE CASCADE,
            person_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            frame_index INTEGER NOT NULL,
            timestamp_s REAL NOT NULL,
            "left" INTEGER NOT NULL,
            "top" INTEGER NOT NULL,
            "right" INTEGER NOT NULL,
            "bottom" INTEGER NOT NULL,
            distance REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_video_hits_media_person ON video_hits(media_id, person_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_video_hits_timestamp ON video_hits(timestamp_s)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_video_hits_person ON video_hits(person_id)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_schema_on_fresh_database() {
        let temp = TempDir::new().unwrap();
        let pool = init_database(&temp.path().join("facewatch.db")).await.unwrap();

        for table in ["media", "people", "video_hits"] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "table {} missing", table);
        }
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("facewatch.db");
        let pool = init_database(&path).await.unwrap();
        drop(pool);
        // Second open must not fail or clobber the schema
        init_database(&path).await.unwrap();
    }
}
