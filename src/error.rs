//! Error types for chatrelay
//!
//! `AppError` implements `IntoResponse` for Axum handlers. Component-level
//! failures (`CompletionError`, `PromptError`) are plain values that callers
//! turn into user-visible messages or fallbacks.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

/// Failure of a single completion call
///
/// The `Display` output is the human-readable message shown to users
/// (prefixed with `"Error: "` by the router and session).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Cannot request a completion for an empty conversation")]
    EmptyConversation,

    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("Server responded with status: {status}")]
    Status { status: u16 },

    #[error("Malformed response payload: {reason}")]
    MalformedResponse { reason: String },

    #[error("Response contained no completion choices")]
    NoChoices,

    /// Error text reported by a relay server in its response body
    #[error("{0}")]
    Upstream(String),
}

/// A named prompt could not be loaded
///
/// Always recovered by substituting the prompt's fallback text.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt '{0}' is not an allowed prompt name")]
    NotAllowed(String),

    #[error("Prompt '{name}' is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}
