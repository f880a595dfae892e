//! In-memory stand-ins for the repository and media backend used by tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use crate::models::{NewVideo, SearchTerm, VideoRow};
use crate::services::media::{MediaBackend, MediaError, MediaUpload, StoredMedia};
use crate::services::repository::VideoRepository;

pub fn sample_upload() -> MediaUpload {
    MediaUpload {
        file_name: "clip.mp4".to_string(),
        content_type: Some("video/mp4".to_string()),
        bytes: Bytes::from_static(b"not really an mp4"),
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    videos: Mutex<Vec<NewVideo>>,
    fail_inserts: AtomicBool,
    lose_delete_race: AtomicBool,
}

impl InMemoryRepository {
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    /// Make the next row delete find the row already gone, as if another
    /// request with the same token removed it first
    pub fn lose_delete_race(&self) {
        self.lose_delete_race.store(true, Ordering::SeqCst);
    }

    pub fn stored_token(&self, video_id: &str) -> Option<String> {
        self.videos
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == video_id)
            .map(|v| v.delete_token.clone())
    }
}

#[async_trait]
impl VideoRepository for InMemoryRepository {
    async fn insert(&self, video: &NewVideo) -> Result<(), sqlx::Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.videos.lock().unwrap().push(video.clone());
        Ok(())
    }

    async fn list(&self, search: Option<&SearchTerm>) -> Result<Vec<VideoRow>, sqlx::Error> {
        let videos = self.videos.lock().unwrap();
        let mut rows: Vec<VideoRow> = videos
            .iter()
            .filter(|v| search.is_none_or(|term| term.matches(&v.title, &v.description)))
            .map(VideoRow::from)
            .collect();
        rows.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(rows)
    }

    async fn get(&self, video_id: &str) -> Result<Option<VideoRow>, sqlx::Error> {
        let videos = self.videos.lock().unwrap();
        Ok(videos.iter().find(|v| v.id == video_id).map(VideoRow::from))
    }

    async fn delete_token(&self, video_id: &str) -> Result<Option<String>, sqlx::Error> {
        Ok(self.stored_token(video_id))
    }

    async fn delete(&self, video_id: &str) -> Result<bool, sqlx::Error> {
        let mut videos = self.videos.lock().unwrap();
        let before = videos.len();
        videos.retain(|v| v.id != video_id);
        if self.lose_delete_race.swap(false, Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(videos.len() < before)
    }
}

#[derive(Default)]
pub struct FakeMedia {
    counter: AtomicUsize,
    uploaded: Mutex<Vec<String>>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeMedia {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaBackend for FakeMedia {
    async fn upload(&self, upload: MediaUpload) -> Result<StoredMedia, MediaError> {
        if upload.bytes.is_empty() {
            return Err(MediaError::Api {
                status: 400,
                message: "Empty file".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let public_id = format!("cliptube_videos/fake{}", n);
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(StoredMedia {
            secure_url: format!("https://media.example.com/{}.mp4", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        Ok(())
    }

    fn thumbnail_url(&self, public_id: &str) -> String {
        format!("https://media.example.com/{}.jpg", public_id)
    }
}
