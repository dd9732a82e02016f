//! Routing logic for chatrelay
//!
//! A first-pass completion call classifies each user turn. The label it returns
//! selects which model configuration answers the turn and which messages it sees.

pub mod dispatch;
pub mod label;

pub use dispatch::MessageRouter;
pub use label::ClassificationLabel;

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target model configuration
///
/// Maps to config.toml: models.chat, models.reason, models.search.
/// Upstream model identifiers are deployment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    /// General-purpose model
    #[default]
    Chat,
    /// Higher-latency reasoning model
    Reason,
    /// Web-search-augmented model
    Search,
}

impl ModelKey {
    pub const ALL: [ModelKey; 3] = [ModelKey::Chat, ModelKey::Reason, ModelKey::Search];

    /// Convert to string representation for logging, metrics labels and the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Reason => "reason",
            Self::Search => "search",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKey {
    type Err = String;

    /// Strict, case-sensitive parse of a wire model key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "reason" => Ok(Self::Reason),
            "search" => Ok(Self::Search),
            other => Err(format!(
                "unknown model key '{}' (expected chat, reason or search)",
                other
            )),
        }
    }
}

/// Result of a routing decision
///
/// Derived from a classification label and the caller's conversation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Label the decision was made from
    pub label: ClassificationLabel,
    /// Which model configuration answers the turn
    pub target: ModelKey,
    /// Messages sent to the target model, in order
    pub messages: Vec<Message>,
}

/// Decide target model and message set for a classification label
///
/// Pure: the same inputs always yield the same decision.
///
/// | label   | target | messages                            |
/// |---------|--------|-------------------------------------|
/// | chat    | chat   | history + user                      |
/// | search  | search | history + user                      |
/// | complex | reason | history + user                      |
/// | context | chat   | history + user + question prompt    |
/// | other   | chat   | history + user                      |
pub fn decide(
    label: ClassificationLabel,
    history: &[Message],
    user_message: &Message,
    question_prompt: &Message,
) -> RoutingDecision {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.extend_from_slice(history);
    messages.push(user_message.clone());
    if label == ClassificationLabel::Context {
        messages.push(question_prompt.clone());
    }

    RoutingDecision {
        target: label.target(),
        label,
        messages,
    }
}
