//! Video API endpoints for the cloud variant (/api/upload, /api/videos/*)

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{delete, get, post},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::constants::{DELETE_MESSAGE, UPLOAD_MESSAGE};
use crate::models::{SearchTerm, VideoResponse};
use crate::services::error::{ApiError, LogErr, MessageBody};
use crate::services::media::MediaUpload;
use crate::services::videos::{self, UploadRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload", post(upload_video))
        .route("/api/videos", get(list_videos))
        .route("/api/videos/{id}", get(get_video))
        .route("/api/videos/{id}/delete", delete(delete_video))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
struct DeleteQuery {
    token: Option<String>,
}

/// Upload echo: the public record plus a ready-made deletion link
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedVideo {
    #[serde(flatten)]
    pub video: VideoResponse,
    pub delete_link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub video: UploadedVideo,
}

/// POST /api/upload - multipart with a `video` file, `title` and optional `description`
async fn upload_video(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut file = None;
    let mut title = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .log_400("Invalid multipart body.")?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let bytes = field.bytes().await.log_400("Failed to read video file.")?;

                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    file = Some(MediaUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            "title" => title = Some(field.text().await.log_400("Invalid title field.")?),
            "description" => {
                description = Some(field.text().await.log_400("Invalid description field.")?)
            }
            _ => {}
        }
    }

    let request = UploadRequest::new(title, description, file)?;
    let outcome = videos::upload_video(&*state.videos, &*state.media, request).await?;

    let base = state
        .public_base_url
        .clone()
        .unwrap_or_else(|| base_url_from_headers(&headers));
    let delete_link = build_delete_link(&base, &outcome.video.id, &outcome.delete_token);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: UPLOAD_MESSAGE.to_string(),
            video: UploadedVideo {
                video: outcome.video,
                delete_link,
            },
        }),
    ))
}

/// GET /api/videos?search= - list videos, newest first
async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<VideoResponse>>, ApiError> {
    let search = SearchTerm::parse(query.search.as_deref());
    let videos = videos::list_videos(&*state.videos, search.as_ref()).await?;
    Ok(Json(videos))
}

/// GET /api/videos/:id - single video details
async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let video = videos::get_video(&*state.videos, &video_id).await?;
    Ok(Json(video))
}

/// DELETE /api/videos/:id/delete?token= - delete a video with its capability token
async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<MessageBody>, ApiError> {
    videos::delete_video(
        &*state.videos,
        &*state.media,
        &video_id,
        query.token.as_deref(),
    )
    .await?;

    Ok(Json(MessageBody::new(DELETE_MESSAGE)))
}

/// Reconstruct the externally visible base URL from proxy/Host headers
fn base_url_from_headers(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}

fn build_delete_link(base: &str, video_id: &str, token: &str) -> String {
    format!(
        "{}/api/videos/{}/delete?token={}",
        base.trim_end_matches('/'),
        percent_encode(video_id),
        percent_encode(token)
    )
}

/// Everything but RFC 3986 unreserved characters, so ids and base64url tokens stay readable
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}
