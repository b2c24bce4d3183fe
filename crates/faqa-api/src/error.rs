//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faqa_core::FaqError;
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Rejected input (400)
    BadRequest(String),
    /// Dataset could not be indexed (422)
    Unprocessable(String),
    /// Index has not been built yet (503)
    IndexUnavailable(String),
    /// An upstream provider failed (502)
    Upstream(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for an end user
    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unprocessable(msg)
            | AppError::IndexUnavailable(msg)
            | AppError::Upstream(msg) => msg,
            AppError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::BadRequest(msg) => ApiError::bad_request(msg),
            AppError::Unprocessable(msg) => ApiError::new("DATASET_ERROR", msg),
            AppError::IndexUnavailable(msg) => ApiError::new("INDEX_NOT_READY", msg),
            AppError::Upstream(msg) => {
                ApiError::new("UPSTREAM_ERROR", "Upstream service failed").with_details(msg)
            }
            AppError::Internal(msg) => ApiError::internal_error().with_details(msg),
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<FaqError> for AppError {
    fn from(err: FaqError) -> Self {
        match err {
            FaqError::InvalidQuestion(msg) => AppError::BadRequest(msg),
            FaqError::DataSource(msg) => AppError::Unprocessable(msg),
            err @ FaqError::IndexNotFound { .. } => AppError::IndexUnavailable(err.to_string()),
            err @ (FaqError::EmbeddingService(_) | FaqError::CompletionService(_)) => {
                AppError::Upstream(err.to_string())
            }
            err @ (FaqError::Configuration(_) | FaqError::IndexCorrupted { .. }) => {
                AppError::Internal(err.to_string())
            }
            FaqError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
