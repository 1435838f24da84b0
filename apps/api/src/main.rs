mod config;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resume::extraction::LlmResumeExtractor;
use crate::resume::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeAI API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let extractor = Arc::new(LlmResumeExtractor::new(llm, config.extraction_mode));
    info!(
        "Resume extractor ready ({:?} mode, uploads up to {} bytes)",
        config.extraction_mode, config.max_upload_bytes
    );

    let state = AppState {
        sessions: SessionStore::new(),
        extractor,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the form's origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
