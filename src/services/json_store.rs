//! Flat JSON file store for the local variant.
//!
//! The whole file is read, changed in memory and rewritten for every mutation.
//! A mutex is held across each read-modify-write so concurrent requests cannot
//! overwrite each other's changes, and writes land through a temp file plus
//! rename so a reader never sees a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::models::{LocalVideo, SearchTerm};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupt video file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize videos: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct JsonVideoStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonVideoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All videos in file order, optionally filtered
    pub async fn list(&self, search: Option<&SearchTerm>) -> Result<Vec<LocalVideo>, StoreError> {
        let _guard = self.lock.lock().await;
        let videos = self.load().await?;

        Ok(match search {
            Some(term) => videos
                .into_iter()
                .filter(|v| term.matches(&v.title, &v.description))
                .collect(),
            None => videos,
        })
    }

    pub async fn get(&self, video_id: &str) -> Result<Option<LocalVideo>, StoreError> {
        let _guard = self.lock.lock().await;
        let videos = self.load().await?;
        Ok(videos.into_iter().find(|v| v.id == video_id))
    }

    /// Append a video to the end of the file
    pub async fn insert(&self, video: LocalVideo) -> Result<LocalVideo, StoreError> {
        let _guard = self.lock.lock().await;
        let mut videos = self.load().await?;
        videos.push(video.clone());
        self.save(&videos).await?;
        Ok(video)
    }

    /// Increment the view counter and return the updated video
    pub async fn record_view(&self, video_id: &str) -> Result<Option<LocalVideo>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut videos = self.load().await?;

        let Some(video) = videos.iter_mut().find(|v| v.id == video_id) else {
            return Ok(None);
        };
        video.views += 1;
        let updated = video.clone();

        self.save(&videos).await?;
        Ok(Some(updated))
    }

    async fn load(&self) -> Result<Vec<LocalVideo>, StoreError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&contents).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, videos: &[LocalVideo]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(videos)?;
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}
