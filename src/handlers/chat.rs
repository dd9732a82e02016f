//! Chat endpoint handler
//!
//! Handles POST /api/chat: one completion call for a caller-supplied message
//! list and model key. Routing is done by the caller (a conversation session);
//! this endpoint keeps the upstream API key and model mapping server-side.

use crate::error::AppError;
use crate::handlers::AppState;
use crate::message::Message;
use crate::middleware::RequestId;
use crate::router::ModelKey;
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Chat request from client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Model key (`chat`, `reason` or `search`); anything else falls back to `chat`
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>, model: ModelKey) -> Self {
        Self {
            messages,
            model: model.as_str().to_string(),
            conversation_id: None,
            user_id: None,
        }
    }

    /// Model key for this request, falling back to `chat` for unknown values
    pub fn model_key(&self) -> ModelKey {
        self.model.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "Unknown model in chat request, defaulting to chat");
            ModelKey::Chat
        })
    }
}

/// Chat response to client
///
/// `error` is present only when the completion failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn ok(message: Message) -> Self {
        Self {
            message,
            error: None,
        }
    }

    /// Failure response with an empty assistant message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(""),
            error: Some(error.into()),
        }
    }
}

/// Chat endpoint handler
///
/// # Responses
///
/// - `200 OK` with `{"message": ...}` on success
/// - `200 OK` with an apologetic message and `"error"` when the upstream call fails
/// - `400 Bad Request` for malformed bodies or an empty `messages` list
/// - `500 Internal Server Error` with `"error"` when no API key is configured
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return AppError::Validation(rejection.body_text()).into_response();
        }
    };

    if let Err(e) = state.config().upstream.require_api_key() {
        tracing::error!(request_id = %request_id, error = %e, "Rejecting chat request");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse::failed(e.to_string())),
        )
            .into_response();
    }

    if request.messages.is_empty() {
        return AppError::Validation("messages cannot be empty".to_string()).into_response();
    }

    let model = request.model_key();
    tracing::debug!(
        request_id = %request_id,
        model = %model,
        message_count = request.messages.len(),
        conversation_id = request.conversation_id.as_deref().unwrap_or("-"),
        "Received chat request"
    );

    match state.client().generate(&request.messages, model).await {
        Ok(message) => Json(ChatResponse::ok(message)).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, model = %model, error = %e, "Chat completion failed");
            Json(ChatResponse {
                message: Message::assistant(format!("Sorry, there was an error: {}", e)),
                error: Some(e.to_string()),
            })
            .into_response()
        }
    }
}
