//! Completion clients
//!
//! A completion client sends an ordered list of role-tagged messages to a model
//! configuration and returns a single assistant message. Implementations:
//!
//! - [`OpenAiClient`]: talks to an OpenAI-compatible chat-completions API directly
//! - [`RelayClient`]: talks to a running chatrelay server's `/api/chat` endpoint
//! - [`Instrumented`]: wraps any client and records Prometheus metrics
//!
//! Clients are constructed explicitly and passed in; there is no shared global instance.

pub mod openai;
pub mod relay;

pub use openai::OpenAiClient;
pub use relay::RelayClient;

use crate::error::CompletionError;
use crate::message::Message;
use crate::metrics::Metrics;
use crate::router::ModelKey;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Trait for completion calls
///
/// Allows dependency injection of different client implementations,
/// enabling testing with mock clients that don't make real network calls.
///
/// Each call issues exactly one outbound request and never retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate one assistant message for `messages` using the `model` configuration
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::EmptyConversation` without any network call when
    /// `messages` is empty, and another `CompletionError` variant for network
    /// failures, non-2xx statuses or malformed payloads.
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError> {
        (**self).generate(messages, model).await
    }
}

/// Client decorator recording completion outcomes and latency
pub struct Instrumented<C> {
    inner: C,
    metrics: Arc<Metrics>,
}

impl<C: CompletionClient> Instrumented<C> {
    pub fn new(inner: C, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for Instrumented<C> {
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError> {
        let started = Instant::now();
        let result = self.inner.generate(messages, model).await;
        let elapsed = started.elapsed();

        self.metrics.record_completion(model, result.is_ok(), elapsed);
        match &result {
            Ok(message) => tracing::debug!(
                model = %model,
                elapsed_ms = elapsed.as_millis() as u64,
                response_length = message.content.len(),
                "Completion succeeded"
            ),
            Err(e) => tracing::warn!(
                model = %model,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "Completion failed"
            ),
        }

        result
    }
}
