//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chatrelay::client::CompletionClient;
use chatrelay::error::CompletionError;
use chatrelay::message::Message;
use chatrelay::router::ModelKey;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub messages: Vec<Message>,
    pub model: ModelKey,
}

/// Completion client answering from a fixed script and recording every call
///
/// Once the script runs out, calls fail with an upstream error.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<Message, CompletionError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<Message, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script of successful assistant replies
    pub fn replying(contents: &[&str]) -> Self {
        Self::new(
            contents
                .iter()
                .map(|content| Ok(Message::assistant(*content)))
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn generate(
        &self,
        messages: &[Message],
        model: ModelKey,
    ) -> Result<Message, CompletionError> {
        self.calls.lock().unwrap().push(Call {
            messages: messages.to_vec(),
            model,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Upstream("script exhausted".to_string())))
    }
}

pub fn system_msg() -> Message {
    Message::system("You are a helpful assistant.")
}

pub fn welcome_msg() -> Message {
    Message::assistant("How can I help you today?")
}
