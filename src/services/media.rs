//! Media backend port: where video bytes live and how playback URLs are built.

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("media API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected media API response: {0}")]
    UnexpectedResponse(String),
}

/// A file received from the client, ready to hand to the backend
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// What the backend reports after storing an upload
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMedia {
    /// Backend identifier, used as the video id
    pub public_id: String,
    /// HTTPS playback URL
    pub secure_url: String,
}

#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Store a video, applying the upload transformation
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError>;

    /// Remove a stored video. Removing an unknown id is not an error.
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;

    /// Derived thumbnail URL for a stored video
    fn thumbnail_url(&self, public_id: &str) -> String;
}
