//! Error types surfaced by the HTTP layer

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned from route handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body is missing a required field
    #[error("{0}")]
    BadRequest(&'static str),

    /// A requested user does not exist upstream
    #[error("{0}")]
    NotFound(String),

    /// An upstream fetch or text generation failed
    #[error("{context}: {message}")]
    Failed {
        context: &'static str,
        message: String,
    },
}

impl AppError {
    /// Wraps a failure with the route-level message shown to clients
    pub fn failed(context: &'static str, err: impl Display) -> Self {
        let message = err.to_string();
        error!(context, error = %message, "request failed");
        AppError::Failed { context, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            AppError::Failed { context, message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": context, "message": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors that stop the server from starting or serving
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving the listener failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The shared HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
