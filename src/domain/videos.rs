//! Queries for the `videos` table, generic over `Executor` and called with `&PgPool`.
//!
//! Search uses `strpos` on lowercased text so `%` and `_` in a term match
//! literally, the same rule as `SearchTerm::matches`. These queries have no
//! database-backed tests; the handler tests run against the in-memory repository.

use sqlx::{Executor, Postgres};

use crate::models::{NewVideo, VideoRow};

/// Create the `videos` table if it does not exist yet
pub async fn init_schema<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            video_url TEXT NOT NULL,
            thumbnail_url TEXT,
            upload_date TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP,
            delete_token TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(executor)
    .await?;

    Ok(())
}

/// Insert a new video record
pub async fn insert_video<'e, E>(executor: E, video: &NewVideo) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO videos (id, title, description, video_url, thumbnail_url, upload_date, delete_token)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(&video.id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.video_url)
    .bind(&video.thumbnail_url)
    .bind(video.upload_date)
    .bind(&video.delete_token)
    .execute(executor)
    .await?;

    Ok(())
}

/// List videos newest first, optionally filtered by a lowercased search term
/// matched as a substring of the lowercased title or description
pub async fn list_videos<'e, E>(
    executor: E,
    search: Option<&str>,
) -> Result<Vec<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, title, description, video_url, thumbnail_url, upload_date
        FROM videos
        WHERE $1::text IS NULL
           OR strpos(LOWER(title), $1) > 0
           OR strpos(LOWER(COALESCE(description, '')), $1) > 0
        ORDER BY upload_date DESC
        "#,
    )
    .bind(search)
    .fetch_all(executor)
    .await
}

/// Get a single video by id
pub async fn get_video<'e, E>(executor: E, video_id: &str) -> Result<Option<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, title, description, video_url, thumbnail_url, upload_date
        FROM videos
        WHERE id = $1
        "#,
    )
    .bind(video_id)
    .fetch_optional(executor)
    .await
}

/// Get the stored delete token for a video
pub async fn get_delete_token<'e, E>(
    executor: E,
    video_id: &str,
) -> Result<Option<String>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT delete_token FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(token,)| token))
}

/// Delete a video record. Returns whether a row was removed.
pub async fn delete_video<'e, E>(executor: E, video_id: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
