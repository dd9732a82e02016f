//! Dispatch of a classified turn to its target model

use super::{ClassificationLabel, RoutingDecision, decide};
use crate::client::CompletionClient;
use crate::message::Message;
use crate::metrics::Metrics;
use std::sync::Arc;

/// Routes a classified user turn to the matching model configuration
///
/// Stateless between calls: everything a call needs is passed in.
/// Failures of the final completion call are terminal here and come back as
/// an ordinary assistant message (`"Error: <reason>"`), never as an error value.
#[derive(Clone)]
pub struct MessageRouter {
    client: Arc<dyn CompletionClient>,
    metrics: Option<Arc<Metrics>>,
}

impl MessageRouter {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            metrics: None,
        }
    }

    /// Record routing decisions in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Completion client used for both the classification and final calls
    pub fn client(&self) -> &dyn CompletionClient {
        self.client.as_ref()
    }

    /// Decide target model and message set for a raw label (no network I/O)
    pub fn plan(
        &self,
        label: &str,
        history: &[Message],
        user_message: &Message,
        question_prompt: &Message,
    ) -> RoutingDecision {
        let label = ClassificationLabel::parse(label);
        if let ClassificationLabel::Unrecognized(raw) = &label {
            tracing::warn!(
                label = %raw,
                "Unknown routing response, defaulting to chat"
            );
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_routing_decision(&label);
        }
        decide(label, history, user_message, question_prompt)
    }

    /// Route a classified turn and return the final assistant message
    ///
    /// Calls the completion client exactly once.
    pub async fn route(
        &self,
        label: &str,
        history: &[Message],
        user_message: &Message,
        question_prompt: &Message,
    ) -> Message {
        let decision = self.plan(label, history, user_message, question_prompt);

        tracing::info!(
            label = %decision.label,
            target_model = %decision.target,
            message_count = decision.messages.len(),
            "Routing turn"
        );

        match self.client.generate(&decision.messages, decision.target).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(
                    target_model = %decision.target,
                    error = %e,
                    "Final completion call failed"
                );
                Message::error(e)
            }
        }
    }
}
