use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use figproxy_core::{DesignService, FigmaConfig, FigmaEnv};

/// Main entry point for the figproxy REST server
///
/// Reads configuration once at startup and serves the design-file proxy.
///
/// # Environment Variables
/// - `FIGPROXY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `FIGMA_ACCESS_TOKEN`: credential for the design-file service (required)
/// - `FIGMA_FILE_KEY`: file used when a request omits `fileId`
/// - `FIGMA_API_BASE`, `FIGMA_AUTH_SCHEME`, `FIGMA_TIMEOUT_SECS`: optional overrides
///
/// A `.env` file in the working directory is loaded first, if present.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the design-file configuration is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("figproxy=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("FIGPROXY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(FigmaConfig::from_env_values(FigmaEnv::from_process())?);
    match cfg.default_file_key() {
        Some(key) => tracing::info!("Default design file: {}", key),
        None => tracing::warn!("FIGMA_FILE_KEY not set; requests must supply fileId"),
    }

    let state = AppState {
        design_service: DesignService::new(cfg)?,
    };

    tracing::info!("++ Starting figproxy REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
