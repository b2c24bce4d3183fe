//! Index rebuild handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// Rebuild the vector index from the configured dataset
pub async fn rebuild_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let dataset = &state.config.dataset;
    let summary = state
        .builder
        .build_index(&dataset.path, &dataset.key_column)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "index rebuild failed");
            AppError::from(e)
        })?;

    Ok(Json(summary))
}
