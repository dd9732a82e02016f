//! Configuration management for chatrelay
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; missing values take the defaults below.
//! A few environment variables override the file after parsing:
//!
//! | Variable                | Overrides                        |
//! |-------------------------|----------------------------------|
//! | `OPENAI_API_KEY`        | `upstream.api_key`               |
//! | `MAX_COMPLETION_TOKENS` | `upstream.max_completion_tokens` |
//! | `DEFAULT_MODEL`         | `models.chat`                    |

use crate::error::{AppError, AppResult};
use crate::router::ModelKey;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Hosted completions API settings
///
/// Fields are private; values are validated by `Config::validate()` and only
/// changed afterwards through environment overrides, which re-validate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default, skip_serializing)]
    api_key: Option<String>,
    #[serde(default = "default_max_completion_tokens")]
    max_completion_tokens: u32,
    /// Whole-request timeout for upstream calls; unset means no timeout
    #[serde(default)]
    request_timeout_seconds: Option<u64>,
}

impl UpstreamConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> AppResult<&str> {
        self.api_key()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))
    }

    /// `max_tokens` sent with every completion request
    pub fn max_completion_tokens(&self) -> u32 {
        self.max_completion_tokens
    }

    pub fn request_timeout_seconds(&self) -> Option<u64> {
        self.request_timeout_seconds
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            max_completion_tokens: default_max_completion_tokens(),
            request_timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_completion_tokens() -> u32 {
    2000
}

/// Mapping from model keys to upstream model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ModelsConfig {
    #[serde(default = "default_chat_model")]
    pub chat: String,
    #[serde(default = "default_reason_model")]
    pub reason: String,
    #[serde(default = "default_search_model")]
    pub search: String,
}

impl ModelsConfig {
    /// Upstream model identifier for `key`
    pub fn upstream_name(&self, key: ModelKey) -> &str {
        match key {
            ModelKey::Chat => &self.chat,
            ModelKey::Reason => &self.reason,
            ModelKey::Search => &self.search,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            chat: default_chat_model(),
            reason: default_reason_model(),
            search: default_search_model(),
        }
    }
}

fn default_chat_model() -> String {
    "gpt-4.1-mini-2025-04-14".to_string()
}

fn default_reason_model() -> String {
    "o4-mini-2025-04-16".to_string()
}

fn default_search_model() -> String {
    "gpt-4o-mini-search-preview-2025-03-11".to_string()
}

/// Prompt file location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptsConfig {
    /// Directory holding `identityprompt.txt`, `queryprompt.txt` and `questionprompt.txt`
    #[serde(default = "default_prompts_dir")]
    pub dir: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dir: default_prompts_dir(),
        }
    }
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Config file read when no `--config` path is given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl Config {
    /// Load the configuration for the binary
    ///
    /// An explicit `path` must exist. Without one, `config.toml` is read if it
    /// exists; otherwise built-in defaults plus environment overrides are used.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                let config =
                    Self::default().with_env_overrides(|name| std::env::var(name).ok())?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        // Phase 3: Environment overrides, then validation
        config
            .with_env_overrides(|name| std::env::var(name).ok())
            .and_then(|config| config.validate().map(|()| config))
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })
    }

    /// Apply environment overrides using `lookup` to read variables
    ///
    /// # Errors
    /// Returns `AppError::Config` if `MAX_COMPLETION_TOKENS` is not a positive integer.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.upstream.api_key = Some(key);
        }

        if let Some(raw) = lookup("MAX_COMPLETION_TOKENS") {
            let tokens = raw.trim().parse::<u32>().map_err(|e| {
                AppError::Config(format!(
                    "MAX_COMPLETION_TOKENS must be a positive integer, got '{}': {}",
                    raw, e
                ))
            })?;
            self.upstream.max_completion_tokens = tokens;
        }

        if let Some(model) = lookup("DEFAULT_MODEL").filter(|v| !v.trim().is_empty()) {
            tracing::debug!(model = %model, "Overriding chat model from DEFAULT_MODEL");
            self.models.chat = model;
        }

        Ok(self)
    }

    /// Validate configuration after parsing
    ///
    /// The API key is not required here: the server can start without one and
    /// reports a configuration error per request instead.
    pub fn validate(&self) -> AppResult<()> {
        let base_url = &self.upstream.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "upstream.base_url '{}' must start with 'http://' or 'https://'",
                base_url
            )));
        }

        if self.upstream.max_completion_tokens == 0 {
            return Err(AppError::Config(
                "upstream.max_completion_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(timeout) = self.upstream.request_timeout_seconds {
            if timeout == 0 || timeout > 300 {
                return Err(AppError::Config(format!(
                    "upstream.request_timeout_seconds must be in 1..=300, got {}",
                    timeout
                )));
            }
        }

        for key in ModelKey::ALL {
            if self.models.upstream_name(key).trim().is_empty() {
                return Err(AppError::Config(format!(
                    "models.{} cannot be empty",
                    key.as_str()
                )));
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
