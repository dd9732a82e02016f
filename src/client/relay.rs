//! Client for a running chatrelay server
//!
//! Posts conversations to `{server}/api/chat`, letting the server hold the
//! upstream API key and model mapping.

use super::CompletionClient;
use crate::error::{AppError, AppResult, CompletionError};
use crate::handlers::chat::{ChatRequest, ChatResponse};
use crate::message::Message;
use crate::middleware::{REQUEST_ID_HEADER, RequestId};
use crate::router::ModelKey;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    chat_url: String,
}

impl RelayClient {
    /// Create a client for the server at `server_url` (e.g. `http://127.0.0.1:3000`)
    pub fn new(server_url: &str) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            chat_url: format!("{}/api/chat", server_url.trim_end_matches('/')),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl CompletionClient for RelayClient {
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyConversation);
        }

        let request_id = RequestId::new();
        tracing::debug!(
            request_id = %request_id,
            model = %model,
            message_count = messages.len(),
            "Sending relay request"
        );

        let body = ChatRequest::new(messages.to_vec(), model);
        let response = self
            .http
            .post(&self.chat_url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Request {
                endpoint: self.chat_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                "Relay server returned non-success status"
            );
            return Err(CompletionError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| CompletionError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        match parsed.error {
            Some(error) => Err(CompletionError::Upstream(error)),
            None => Ok(Message::assistant(parsed.message.content)),
        }
    }
}
