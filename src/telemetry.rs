use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the global fmt subscriber, honoring `RUST_LOG`
pub fn init() {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
