//! FAQA API Server

use faqa_api::{create_router, state::AppState};
use faqa_core::{logging::init_tracing, AppConfig};
use faqa_rag::create_llm_client;
use faqa_vector::create_embedding_client;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (optional TOML file, then .env and environment)
    let config_path = std::env::var("FAQA_CONFIG").ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    init_tracing(&config.logging, "faqa_api=debug,tower_http=debug");

    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    let embedder = create_embedding_client(&config.embedding, &config.credentials)?;
    let llm = create_llm_client(&config.llm, &config.credentials)?;
    tracing::info!(
        embedding_model = embedder.model_name(),
        llm = llm.name(),
        index = %config.index.path.display(),
        "providers configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = Arc::new(AppState::new(config, Arc::from(embedder), Arc::from(llm)));
    if !state.is_ready() {
        tracing::warn!("vector index not built yet; POST /api/v1/index or run `faqa build`");
    }

    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("FAQA API Server starting on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
