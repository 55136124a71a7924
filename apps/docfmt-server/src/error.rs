//! Error types for the docfmt server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use format_config::ConfigError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::engine::EngineError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("File not found or expired")]
    FileNotFound,

    #[error("Invalid format config: {0}")]
    InvalidConfig(ConfigError),

    /// Import and export failures keep the config error's own wording
    #[error("{0}")]
    Config(ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::FileNotFound => (StatusCode::NOT_FOUND, "FILE_NOT_FOUND"),
            ServerError::InvalidConfig(_) | ServerError::Config(ConfigError::Parse(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_CONFIG")
            }
            ServerError::Config(ConfigError::Encode(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ServerError::Config(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            ServerError::Engine(EngineError::Rejected(_)) => {
                (StatusCode::BAD_REQUEST, "ENGINE_REJECTED")
            }
            ServerError::Engine(EngineError::Unavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, "ENGINE_UNAVAILABLE")
            }
            ServerError::Engine(_) => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("{} ({})", self, code);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::InvalidRequest(rejection.body_text())
    }
}
