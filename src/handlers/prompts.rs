//! Prompt endpoint handler
//!
//! Handles GET /api/prompts/{prompt_name} for the three allowed prompt names.

use crate::handlers::AppState;
use crate::prompts::PromptName;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub content: String,
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Prompt not found" })),
    )
        .into_response()
}

/// Prompt handler
///
/// Disallowed names, unreadable prompts and empty prompts all answer
/// `404 {"error": "Prompt not found"}`; callers then use their fallbacks.
pub async fn handler(State(state): State<AppState>, Path(prompt_name): Path<String>) -> Response {
    let name = match PromptName::from_identifier(&prompt_name) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(error = %e, "Attempted to load disallowed prompt");
            return not_found();
        }
    };

    match state.prompts().load(name).await {
        Ok(content) if !content.is_empty() => Json(PromptResponse { content }).into_response(),
        Ok(_) => {
            tracing::warn!(prompt = %name, "Prompt is empty");
            not_found()
        }
        Err(e) => {
            tracing::error!(prompt = %name, error = %e, "Error reading prompt");
            not_found()
        }
    }
}
