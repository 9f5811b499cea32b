// API Server Binary Entry Point
//
// Purpose: Serve the adoption scorer over HTTP
// Usage: cargo run --features api --bin api_server

use breed_scorer_rust::{create_router, AppState, EngineConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "breed_scorer_rust=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // DATA_DIR, READ_MODEL_DIR, PORT, CACHE_TTL_SECS, CACHE_CAPACITY
    let config = EngineConfig::from_env()?;
    config.log_summary();
    let port = config.port;

    // Load the snapshot and its read model
    tracing::info!("Initializing application state...");
    let state = AppState::new(config).await?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
