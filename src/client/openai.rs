//! Direct client for OpenAI-compatible chat-completions APIs

use super::CompletionClient;
use crate::config::{Config, ModelsConfig, UpstreamConfig};
use crate::error::{AppError, AppResult, CompletionError};
use crate::message::Message;
use crate::router::ModelKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for `POST {base_url}/chat/completions`
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    /// `null` for refusals and some tool-call responses
    #[serde(default)]
    content: Option<String>,
}

/// Client for a hosted chat-completions API
///
/// Model keys are resolved to upstream model identifiers through the
/// configured [`ModelsConfig`] table on every call.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    completions_url: String,
    api_key: Option<String>,
    max_tokens: u32,
    models: ModelsConfig,
}

impl OpenAiClient {
    /// Create a client from upstream settings and the model mapping table
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the underlying HTTP client cannot be built.
    pub fn new(upstream: &UpstreamConfig, models: ModelsConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = upstream.request_timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            completions_url: format!(
                "{}/chat/completions",
                upstream.base_url().trim_end_matches('/')
            ),
            api_key: upstream.api_key().map(str::to_string),
            max_tokens: upstream.max_completion_tokens(),
            models,
        })
    }

    /// Create a client from the full application configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(&config.upstream, config.models.clone())
    }

    /// URL every completion request is posted to
    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyConversation);
        }

        let upstream_model = self.models.upstream_name(model);
        tracing::debug!(
            model_key = %model,
            upstream_model = %upstream_model,
            message_count = messages.len(),
            "Calling completions API"
        );

        let body = CompletionRequest {
            model: upstream_model,
            messages,
            max_tokens: self.max_tokens,
        };

        let mut request = self.http.post(&self.completions_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CompletionError::Request {
                endpoint: self.completions_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                upstream_model = %upstream_model,
                status = status.as_u16(),
                "Completions API returned non-success status"
            );
            return Err(CompletionError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| CompletionError::Request {
            endpoint: self.completions_url.clone(),
            reason: e.to_string(),
        })?;
        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::MalformedResponse {
                reason: e.to_string(),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::NoChoices)?;

        Ok(Message::assistant(choice.message.content.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(base_url: &str) -> UpstreamConfig {
        toml::from_str(&format!(
            r#"
base_url = "{}"
api_key = "sk-test"
max_completion_tokens = 512
"#,
            base_url
        ))
        .expect("should parse upstream config")
    }

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        let client = OpenAiClient::new(&upstream("http://localhost:1234/v1/"), ModelsConfig::default())
            .expect("should build client");
        assert_eq!(client.completions_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![Message::system("be brief"), Message::developer("classify")];
        let body = CompletionRequest {
            model: "gpt-4.1-mini-2025-04-14",
            messages: &messages,
            max_tokens: 2000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-4.1-mini-2025-04-14",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "developer", "content": "classify"}
                ],
                "max_tokens": 2000
            })
        );
    }

    #[test]
    fn test_null_content_parses() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content, None);
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected_without_network() {
        // Port 9 (discard) is never contacted: validation happens first
        let client = OpenAiClient::new(&upstream("http://127.0.0.1:9/v1"), ModelsConfig::default())
            .expect("should build client");
        let result = client.generate(&[], ModelKey::Chat).await;
        assert_eq!(result, Err(CompletionError::EmptyConversation));
    }
}
