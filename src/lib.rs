//! chatrelay - chat relay with classification-based model routing
//!
//! Every user turn is classified by a first completion call, then routed to the
//! chat, reasoning or search model configuration for the final answer.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod message;
pub mod metrics;
pub mod middleware;
pub mod prompts;
pub mod router;
pub mod session;
pub mod telemetry;
pub mod terminal;
