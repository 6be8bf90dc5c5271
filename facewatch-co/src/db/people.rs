//! People database operations

use facewatch_common::db::Person;
use facewatch_common::time::now_rfc3339;
use facewatch_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn person_from_row(row: &SqliteRow) -> Person {
    Person {
        id: row.get("id"),
        name: row.get("name"),
        thumbnail_path: row.get("thumbnail_path"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Insert a new person into the identity register
pub async fn insert_person(
    pool: &SqlitePool,
    name: &str,
    thumbnail_path: Option<&str>,
) -> Result<Person> {
    let now = now_rfc3339();
    let result = sqlx::query(
        r#"
        INSERT INTO people (name, thumbnail_path, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(thumbnail_path)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    Ok(Person {
        id,
        name: name.to_string(),
        thumbnail_path: thumbnail_path.map(|p| p.to_string()),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Load person by id
pub async fn load_person(pool: &SqlitePool, id: i64) -> Result<Option<Person>> {
    let row = sqlx::query(
        "SELECT id, name, thumbnail_path, created_at, updated_at FROM people WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| person_from_row(&row)))
}

/// Load all people, newest first
pub async fn load_people(pool: &SqlitePool) -> Result<Vec<Person>> {
    let rows = sqlx::query(
        "SELECT id, name, thumbnail_path, created_at, updated_at FROM people ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(person_from_row).collect())
}

/// Rename a person, returning the fresh record, or None if the id is unknown
pub async fn update_person_name(
    pool: &SqlitePool,
    id: i64,
    name: &str,
) -> Result<Option<Person>> {
    let result = sqlx::query("UPDATE people SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    load_person(pool, id).await
}
