//! Prompt texts consumed by the routing turn
//!
//! Three named prompts drive a turn: the identity prompt seeds the session's
//! system message, the query prompt asks the model for a classification label,
//! and the question prompt is appended for `context` turns. Only these three
//! names can be loaded. A prompt that cannot be loaded is replaced by its
//! fallback, so loading a [`PromptSet`] never fails.

use crate::error::PromptError;
use crate::message::Message;
use crate::metrics::Metrics;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Fallback identity when `identityprompt` is unavailable
pub const IDENTITY_FALLBACK: &str = "You are a helpful assistant.";

/// The closed set of loadable prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptName {
    Identity,
    Query,
    Question,
}

impl PromptName {
    pub const ALL: [PromptName; 3] = [PromptName::Identity, PromptName::Query, PromptName::Question];

    /// Fixed external identifier (file stem and URL segment)
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Identity => "identityprompt",
            Self::Query => "queryprompt",
            Self::Question => "questionprompt",
        }
    }

    /// Resolve an external identifier, rejecting anything outside the allowed set
    pub fn from_identifier(identifier: &str) -> Result<Self, PromptError> {
        Self::ALL
            .into_iter()
            .find(|name| name.identifier() == identifier)
            .ok_or_else(|| PromptError::NotAllowed(identifier.to_string()))
    }
}

impl fmt::Display for PromptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Source of prompt texts
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Load the raw text of `name`
    async fn load(&self, name: PromptName) -> Result<String, PromptError>;
}

/// Reads prompts from `<dir>/<identifier>.txt`
#[derive(Debug, Clone)]
pub struct FilePromptProvider {
    dir: PathBuf,
}

impl FilePromptProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: PromptName) -> PathBuf {
        self.dir.join(format!("{}.txt", name.identifier()))
    }
}

#[async_trait]
impl PromptProvider for FilePromptProvider {
    async fn load(&self, name: PromptName) -> Result<String, PromptError> {
        let path = self.path_for(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PromptError::Unavailable {
                name: name.identifier().to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

#[derive(Debug, Deserialize)]
struct PromptBody {
    content: String,
}

/// Fetches prompts from a chatrelay server's `/api/prompts/{prompt_name}` endpoint
#[derive(Debug, Clone)]
pub struct RemotePromptProvider {
    http: reqwest::Client,
    base_url: String,
}

impl RemotePromptProvider {
    pub fn new(server_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/api/prompts", server_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PromptProvider for RemotePromptProvider {
    async fn load(&self, name: PromptName) -> Result<String, PromptError> {
        let unavailable = |reason: String| PromptError::Unavailable {
            name: name.identifier().to_string(),
            reason,
        };

        let url = format!("{}/{}", self.base_url, name.identifier());
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("server responded with status: {}", status.as_u16())));
        }

        let body: PromptBody = response
            .json()
            .await
            .map_err(|e| unavailable(format!("malformed prompt body: {}", e)))?;
        Ok(body.content)
    }
}

/// The three prompts a session needs, with fallbacks already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    identity: String,
    query: Message,
    question: Message,
}

impl PromptSet {
    pub fn new(identity: impl Into<String>, query: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            query: Message::developer(query),
            question: Message::developer(question),
        }
    }

    /// Prompt set used when nothing can be loaded
    pub fn fallback() -> Self {
        Self::new(IDENTITY_FALLBACK, "", "")
    }

    /// Load all three prompts concurrently, substituting fallbacks for failures
    ///
    /// An identity prompt that loads but is blank is treated as unavailable.
    pub async fn load(provider: &dyn PromptProvider, metrics: Option<&Metrics>) -> Self {
        let (identity, query, question) = futures::future::join3(
            provider.load(PromptName::Identity),
            provider.load(PromptName::Query),
            provider.load(PromptName::Question),
        )
        .await;

        let resolve = |name: PromptName, result: Result<String, PromptError>, fallback: &str| {
            match result {
                Ok(text) if name != PromptName::Identity || !text.trim().is_empty() => text,
                Ok(_) => {
                    tracing::warn!(prompt = %name, "Prompt is blank, using fallback");
                    if let Some(metrics) = metrics {
                        metrics.record_prompt_fallback(name);
                    }
                    fallback.to_string()
                }
                Err(e) => {
                    tracing::warn!(prompt = %name, error = %e, "Could not load prompt, using fallback");
                    if let Some(metrics) = metrics {
                        metrics.record_prompt_fallback(name);
                    }
                    fallback.to_string()
                }
            }
        };

        Self::new(
            resolve(PromptName::Identity, identity, IDENTITY_FALLBACK),
            resolve(PromptName::Query, query, ""),
            resolve(PromptName::Question, question, ""),
        )
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Developer-role query-classification prompt
    pub fn query(&self) -> &Message {
        &self.query
    }

    /// Developer-role question-answering prompt
    pub fn question(&self) -> &Message {
        &self.question
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::fallback()
    }
}
