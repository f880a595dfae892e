//! Standalone deployment backed by a JSON file on local disk.
//!
//! Videos are added by URL; nothing is uploaded or transcoded. Serves the JSON
//! API plus server-rendered index, upload and watch pages.
//!
//! ## Environment Variables
//! - `VIDEOS_FILE` - JSON file holding the video list (default: `videos.json`)
//! - `PORT` - port to listen on (default: `3001`)
//! - `BIND_ADDR` - interface to bind (default: `0.0.0.0`)

use std::sync::Arc;

use cliptube::config::LocalConfig;
use cliptube::routes;
use cliptube::services::json_store::JsonVideoStore;
use cliptube::{LocalState, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = match LocalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let store = JsonVideoStore::new(&config.videos_file);
    tracing::info!(file = %store.path().display(), "using JSON video store");

    let state = Arc::new(LocalState { store });
    let app = routes::local_app(state, config.server.max_upload_bytes);

    let addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
