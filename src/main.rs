use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use cliptube::config::CloudConfig;
use cliptube::domain::videos;
use cliptube::routes;
use cliptube::services::cloudinary::CloudinaryClient;
use cliptube::{AppState, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();

    let config = match CloudConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    if let Err(e) = videos::init_schema(&pool).await {
        tracing::error!("Database initialization error: {}", e);
    } else {
        tracing::info!("Table 'videos' created or already exists");
    }

    let state = Arc::new(AppState {
        videos: Arc::new(pool),
        media: Arc::new(CloudinaryClient::new(&config.cloudinary)),
        public_base_url: config.public_base_url.clone(),
    });

    let app = routes::cloud_app(state, config.server.max_upload_bytes);

    let addr = config.server.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
