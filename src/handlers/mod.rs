//! HTTP request handlers for the chatrelay API

use crate::client::{CompletionClient, Instrumented, OpenAiClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::prompts::{FilePromptProvider, PromptProvider};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod chat;
pub mod health;
pub mod metrics;
pub mod prompts;

/// Application state shared across all handlers
///
/// Everything is immutable after construction and Arc'd for cheap cloning
/// across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: Arc<dyn CompletionClient>,
    prompts: Arc<dyn PromptProvider>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create state from configuration: an instrumented upstream client and
    /// file-backed prompts from `prompts.dir`
    ///
    /// # Errors
    /// Returns an error if metrics registration or HTTP client construction fails.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let metrics = Arc::new(
            Metrics::new()
                .map_err(|e| AppError::Internal(format!("Failed to create metrics: {}", e)))?,
        );
        let client = Instrumented::new(OpenAiClient::from_config(&config)?, metrics.clone());
        let prompts = FilePromptProvider::new(config.prompts.dir.clone());

        Ok(Self::with_components(
            config,
            Arc::new(client),
            Arc::new(prompts),
            metrics,
        ))
    }

    /// Create state from explicitly constructed components
    pub fn with_components(
        config: Arc<Config>,
        client: Arc<dyn CompletionClient>,
        prompts: Arc<dyn PromptProvider>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            client,
            prompts,
            metrics,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &dyn CompletionClient {
        self.client.as_ref()
    }

    pub fn prompts(&self) -> &dyn PromptProvider {
        self.prompts.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the HTTP application with all routes and middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api", get(health::root_handler))
        .route("/api/health", get(health::handler))
        .route("/api/chat", post(chat::handler))
        .route("/api/prompts/{prompt_name}", get(prompts::handler))
        .route("/metrics", get(metrics::handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        toml::from_str(
            r#"
[server]
port = 3999

[upstream]
base_url = "http://localhost:1234/v1"
api_key = "sk-test"
"#,
        )
        .expect("should parse test config")
    }

    #[test]
    fn test_appstate_new_creates_state() {
        let state = AppState::new(Arc::new(create_test_config())).expect("should create AppState");
        assert_eq!(state.config().server.port, 3999);
        assert_eq!(state.config().upstream.api_key(), Some("sk-test"));
    }

    #[test]
    fn test_appstate_is_clonable() {
        let state = AppState::new(Arc::new(create_test_config())).expect("should create AppState");
        let state2 = state.clone();
        assert_eq!(state2.config().server.port, 3999);
    }
}
