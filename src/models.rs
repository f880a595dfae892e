//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::INITIAL_DURATION;

/// A video row as stored in Postgres, including its deletion capability.
///
/// Only ever built at upload time; reads go through [`VideoRow`], which has no
/// token column.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub delete_token: String,
}

/// A video row read back from the database (never carries the delete token)
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl From<&NewVideo> for VideoRow {
    fn from(video: &NewVideo) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            description: Some(video.description.clone()),
            video_url: video.video_url.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            upload_date: video.upload_date,
        }
    }
}

/// Public JSON shape of a video for the cloud variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
    pub upload_date: DateTime<Utc>,
}

impl From<VideoRow> for VideoResponse {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            upload_date: row.upload_date,
        }
    }
}

/// A video entry in the local JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVideo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default = "initial_duration")]
    pub duration: String,
}

fn initial_duration() -> String {
    INITIAL_DURATION.to_string()
}

impl LocalVideo {
    /// Build a fresh entry with a random id, zero views and zero duration
    pub fn new(title: String, description: String, video_url: String, thumbnail_url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            video_url,
            thumbnail_url,
            upload_date: Utc::now(),
            views: 0,
            duration: initial_duration(),
        }
    }
}

/// Public JSON shape of a video for the local variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVideoResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub upload_date: DateTime<Utc>,
    pub views: u64,
    pub duration: String,
}

impl From<LocalVideo> for LocalVideoResponse {
    fn from(video: LocalVideo) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            upload_date: video.upload_date,
            views: video.views,
            duration: video.duration,
        }
    }
}

/// Lowercased, trimmed search term. Blank input means "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let term = raw?.trim();
        if term.is_empty() {
            None
        } else {
            Some(Self(term.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against title or description
    pub fn matches(&self, title: &str, description: &str) -> bool {
        title.to_lowercase().contains(&self.0) || description.to_lowercase().contains(&self.0)
    }
}
