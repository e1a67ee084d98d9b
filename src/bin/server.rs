//! LeanFit Server
//!
//! Serves the journal over HTTP with JSON in and out.
//!
//! # Configuration
//!
//! Read from `~/.config/leanfit/config.yaml` (or `LEANFIT_CONFIG`), with
//! environment overrides:
//! - `LEANFIT_PORT`: Port to listen on (default: 8080)
//! - `LEANFIT_DATA_DIR`: Directory to store documents (default: ~/.local/share/leanfit)
//! - `LEANFIT_LEGACY_PATH`: Single-tenant document used to seed new users
//! - `LEANFIT_IDENTITY`: `fixed`, `cookie` (default) or `api_key`
//!
//! # Config File Format
//!
//! ```yaml
//! server:
//!   identity: api_key
//! api_keys:
//!   - key: "your-secret-key-here"
//!     user_id: "user1"
//! ```

use leanfit::config::Config;
use leanfit::identity::IdentityStrategy;
use leanfit::server::{router, AppState};
use leanfit::Journal;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leanfit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("LEANFIT_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir.value)?;

    tracing::info!("Data directory: {}", config.data_dir.value.display());
    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }
    if let Some(legacy) = &config.legacy_path.value {
        tracing::info!("Legacy document: {}", legacy.display());
    }

    let identity = config.identity_strategy()?;
    match &identity {
        IdentityStrategy::Fixed(user) => tracing::info!("Identity: fixed user {}", user),
        IdentityStrategy::Cookie { name } => tracing::info!("Identity: cookie '{}'", name),
        IdentityStrategy::ApiKey(keys) => {
            tracing::info!("Identity: {} API key(s)", keys.len());
            if keys.is_empty() {
                tracing::warn!("No API keys loaded - all /api requests will fail");
            }
        }
    }

    let state = AppState::new(
        Journal::new(config.document_store()),
        identity,
        config.clock(),
    );
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port.value));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
