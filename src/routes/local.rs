//! JSON API for the local variant (/api/upload, /api/videos, /api/video/*)

use axum::{
    Form, Json, Router,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::videos::SearchQuery;
use crate::LocalState;
use crate::constants::LOCAL_UPLOAD_MESSAGE;
use crate::models::{LocalVideo, LocalVideoResponse, SearchTerm};
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<LocalState>> {
    Router::new()
        .route("/api/upload", post(upload_video))
        .route("/api/videos", get(list_videos))
        .route("/api/video/{id}", get(get_video))
}

/// Text fields accepted when adding a video by URL
#[derive(Debug, Default, Deserialize)]
pub struct UploadFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl UploadFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "video_url" => self.video_url = Some(value),
            "thumbnail_url" => self.thumbnail_url = Some(value),
            _ => {}
        }
    }

    /// Check required fields and build a new entry
    pub fn into_video(self) -> Result<LocalVideo, ApiError> {
        let title = non_blank(self.title)
            .ok_or_else(|| ApiError::BadRequest("Video title is required.".to_string()))?;
        let video_url = non_blank(self.video_url)
            .ok_or_else(|| ApiError::BadRequest("Video URL is required.".to_string()))?;

        Ok(LocalVideo::new(
            title,
            self.description.unwrap_or_default(),
            video_url,
            non_blank(self.thumbnail_url).unwrap_or_default(),
        ))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts the fields either as multipart/form-data or urlencoded
impl<S: Send + Sync> FromRequest<S> for UploadFields {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(fields) = Form::<UploadFields>::from_request(req, state)
                .await
                .log_400("Invalid form body.")?;
            return Ok(fields);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .log_400("Invalid multipart body.")?;
        let mut fields = UploadFields::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .log_400("Invalid multipart body.")?
        {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await.log_400("Invalid form field.")?;
            fields.set(&name, value);
        }
        Ok(fields)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocalUploadResponse {
    pub message: String,
    pub video: LocalVideoResponse,
}

/// POST /api/upload - add a video by URL
async fn upload_video(
    State(state): State<Arc<LocalState>>,
    fields: UploadFields,
) -> Result<(StatusCode, Json<LocalUploadResponse>), ApiError> {
    let video = state.store.insert(fields.into_video()?).await?;
    tracing::info!(video_id = %video.id, title = %video.title, "video added");

    Ok((
        StatusCode::CREATED,
        Json(LocalUploadResponse {
            message: LOCAL_UPLOAD_MESSAGE.to_string(),
            video: video.into(),
        }),
    ))
}

/// GET /api/videos?search= - list videos in insertion order
async fn list_videos(
    State(state): State<Arc<LocalState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<LocalVideoResponse>>, ApiError> {
    let search = SearchTerm::parse(query.search.as_deref());
    let videos = state.store.list(search.as_ref()).await?;
    Ok(Json(videos.into_iter().map(Into::into).collect()))
}

/// GET /api/video/:id - fetch a video, counting a view
async fn get_video(
    State(state): State<Arc<LocalState>>,
    Path(video_id): Path<String>,
) -> Result<Json<LocalVideoResponse>, ApiError> {
    let video = state
        .store
        .record_view(&video_id)
        .await?
        .ok_or_else(ApiError::video_not_found)?;
    Ok(Json(video.into()))
}
