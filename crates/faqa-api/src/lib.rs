//! FAQA API - HTTP server
//!
//! Serves the browser question form and the JSON endpoints for querying and
//! rebuilding the FAQ index.

pub mod error;
pub mod handlers;
pub mod state;

use crate::handlers::{health, index, query, ui};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_routes = Router::new()
        .route("/query", post(query::query_handler))
        .route("/index", post(index::rebuild_handler));

    Router::new()
        .route("/", get(ui::form_handler))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
