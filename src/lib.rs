//! ClipTube - minimal video hosting backends
//!
//! Two deployments share this library:
//! - `cliptube`: metadata in Postgres, video storage and transcoding on Cloudinary
//! - `cliptube_local`: metadata in a JSON file, videos referenced by URL
//!
//! Layout:
//! - domain/: SQL queries
//! - services/: workflows, stores and the media backend client
//! - routes/: axum handlers and HTML pages
//! - config: environment configuration

pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;

use std::sync::Arc;

use services::json_store::JsonVideoStore;
use services::media::MediaBackend;
use services::repository::VideoRepository;

/// Shared state for the cloud API handlers
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub media: Arc<dyn MediaBackend>,
    pub public_base_url: Option<String>,
}

/// Shared state for the local (JSON file) handlers
pub struct LocalState {
    pub store: JsonVideoStore,
}
