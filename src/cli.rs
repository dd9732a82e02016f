//! Command-line interface for chatrelay
//!
//! Provides argument parsing and subcommand handling for the chatrelay binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chat relay with classification-based model routing
#[derive(Parser)]
#[command(name = "chatrelay")]
#[command(version)]
#[command(about = "Chat relay with classification-based model routing")]
#[command(
    long_about = "chatrelay forwards conversations to a hosted chat-completions API. \
    Each user turn is first classified by the chat model, then answered by the chat, \
    reasoning or search model depending on the classification."
)]
pub struct Cli {
    /// Path to configuration file [default: config.toml, built-in defaults if absent]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Start an interactive conversation in the terminal
    Chat {
        /// Talk to a running chatrelay server instead of the upstream API
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# chatrelay Configuration
# ========================
#
# Every section is optional; the values below are the defaults.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "127.0.0.1"

# Port to listen on
port = 3000

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM COMPLETIONS API
# ─────────────────────────────────────────────────────────────────────────────

[upstream]
# OpenAI-compatible API base URL (requests go to <base_url>/chat/completions)
base_url = "https://api.openai.com/v1"

# API key. Prefer the OPENAI_API_KEY environment variable, which overrides this.
# api_key = "sk-..."

# max_tokens sent with every completion (env: MAX_COMPLETION_TOKENS)
max_completion_tokens = 2000

# Optional whole-request timeout in seconds (1-300). Unset means no timeout.
# request_timeout_seconds = 60

# ─────────────────────────────────────────────────────────────────────────────
# MODELS
# ─────────────────────────────────────────────────────────────────────────────
#
# Upstream model used for each routing target:
#
#   - chat:   classification calls, "chat" and "context" turns, unknown labels
#   - reason: "complex" turns
#   - search: "search" turns

[models]
chat = "gpt-4.1-mini-2025-04-14"        # env: DEFAULT_MODEL
reason = "o4-mini-2025-04-16"
search = "gpt-4o-mini-search-preview-2025-03-11"

# ─────────────────────────────────────────────────────────────────────────────
# PROMPTS
# ─────────────────────────────────────────────────────────────────────────────
#
# Directory containing identityprompt.txt, queryprompt.txt and questionprompt.txt.
# Missing prompts fall back to "You are a helpful assistant." (identity) or empty text.

[prompts]
dir = "prompts"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}
