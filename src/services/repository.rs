//! Metadata store port for the cloud variant, implemented for `PgPool`.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::videos;
use crate::models::{NewVideo, SearchTerm, VideoRow};

#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn insert(&self, video: &NewVideo) -> Result<(), sqlx::Error>;

    /// Newest first, optionally filtered
    async fn list(&self, search: Option<&SearchTerm>) -> Result<Vec<VideoRow>, sqlx::Error>;

    async fn get(&self, video_id: &str) -> Result<Option<VideoRow>, sqlx::Error>;

    async fn delete_token(&self, video_id: &str) -> Result<Option<String>, sqlx::Error>;

    /// Returns whether a record was removed
    async fn delete(&self, video_id: &str) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl VideoRepository for PgPool {
    async fn insert(&self, video: &NewVideo) -> Result<(), sqlx::Error> {
        videos::insert_video(self, video).await
    }

    async fn list(&self, search: Option<&SearchTerm>) -> Result<Vec<VideoRow>, sqlx::Error> {
        videos::list_videos(self, search.map(SearchTerm::as_str)).await
    }

    async fn get(&self, video_id: &str) -> Result<Option<VideoRow>, sqlx::Error> {
        videos::get_video(self, video_id).await
    }

    async fn delete_token(&self, video_id: &str) -> Result<Option<String>, sqlx::Error> {
        videos::get_delete_token(self, video_id).await
    }

    async fn delete(&self, video_id: &str) -> Result<bool, sqlx::Error> {
        videos::delete_video(self, video_id).await
    }
}
