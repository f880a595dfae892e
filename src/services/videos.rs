//! Upload and delete workflows for the cloud variant.
//!
//! Both touch the media backend and the metadata store in sequence with no
//! shared transaction. Upload destroys the remote asset again if the insert
//! fails. Delete removes the remote asset first; if the row delete then
//! fails, the row is left pointing at a missing asset and the failure is
//! logged.

use base64::Engine;
use chrono::Utc;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::models::{NewVideo, SearchTerm, VideoResponse, VideoRow};
use crate::services::error::ApiError;
use crate::services::media::{MediaBackend, MediaUpload};
use crate::services::repository::VideoRepository;

/// A validated upload: a file and a non-blank title
#[derive(Debug)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub file: MediaUpload,
}

impl UploadRequest {
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        file: Option<MediaUpload>,
    ) -> Result<Self, ApiError> {
        let file = file.ok_or_else(|| {
            ApiError::BadRequest("No video file provided for upload.".to_string())
        })?;

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Video title is required.".to_string()))?;

        Ok(Self {
            title,
            description: description.unwrap_or_default(),
            file,
        })
    }
}

/// The created video plus the capability needed to delete it later
#[derive(Debug)]
pub struct UploadOutcome {
    pub video: VideoResponse,
    pub delete_token: String,
}

/// Generate an unguessable deletion token
pub fn generate_delete_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn tokens_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

pub async fn upload_video(
    repo: &dyn VideoRepository,
    media: &dyn MediaBackend,
    request: UploadRequest,
) -> Result<UploadOutcome, ApiError> {
    let stored = media.upload(request.file).await?;
    let thumbnail_url = media.thumbnail_url(&stored.public_id);

    let video = NewVideo {
        id: stored.public_id,
        title: request.title,
        description: request.description,
        video_url: stored.secure_url,
        thumbnail_url: Some(thumbnail_url),
        upload_date: Utc::now(),
        delete_token: generate_delete_token(),
    };

    if let Err(e) = repo.insert(&video).await {
        tracing::error!(video_id = %video.id, error = %e, "failed to save video metadata");
        // Clean up orphaned remote asset on DB failure
        match media.destroy(&video.id).await {
            Ok(()) => tracing::warn!(video_id = %video.id, "cleaned up orphaned remote video"),
            Err(cleanup_err) => tracing::error!(
                video_id = %video.id,
                error = %cleanup_err,
                "failed to clean up orphaned remote video"
            ),
        }
        return Err(e.into());
    }

    tracing::info!(video_id = %video.id, title = %video.title, "video uploaded");

    Ok(UploadOutcome {
        video: VideoRow::from(&video).into(),
        delete_token: video.delete_token,
    })
}

pub async fn list_videos(
    repo: &dyn VideoRepository,
    search: Option<&SearchTerm>,
) -> Result<Vec<VideoResponse>, ApiError> {
    let rows = repo.list(search).await?;
    Ok(rows.into_iter().map(VideoResponse::from).collect())
}

pub async fn get_video(repo: &dyn VideoRepository, video_id: &str) -> Result<VideoResponse, ApiError> {
    repo.get(video_id)
        .await?
        .map(VideoResponse::from)
        .ok_or_else(ApiError::video_not_found)
}

pub async fn delete_video(
    repo: &dyn VideoRepository,
    media: &dyn MediaBackend,
    video_id: &str,
    token: Option<&str>,
) -> Result<(), ApiError> {
    let stored = repo
        .delete_token(video_id)
        .await?
        .ok_or_else(ApiError::video_not_found)?;

    if !tokens_match(&stored, token.unwrap_or_default()) {
        tracing::warn!(video_id, "rejected delete with invalid token");
        return Err(ApiError::Forbidden("Invalid deletion token.".to_string()));
    }

    media.destroy(video_id).await?;

    match repo.delete(video_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(video_id, "metadata row already removed by another delete");
            return Err(ApiError::video_not_found());
        }
        Err(e) => {
            tracing::error!(
                video_id,
                error = %e,
                "remote video deleted but metadata row remains"
            );
            return Err(e.into());
        }
    }

    tracing::info!(video_id, "video deleted");
    Ok(())
}
