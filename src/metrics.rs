//! Prometheus metrics collection for chatrelay
//!
//! This module provides metrics instrumentation for tracking:
//! - Completion calls by model key and outcome
//! - Completion latency by model key
//! - Routing decisions by classification label
//! - Prompt fallbacks by prompt name
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.
//! A `Metrics` value owns its own registry and is passed to the components that record into it.

use crate::prompts::PromptName;
use crate::router::{ClassificationLabel, ModelKey};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Metrics collector for chatrelay
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    completions_total: IntCounterVec,
    completion_duration: HistogramVec,
    routing_decisions: IntCounterVec,
    prompt_fallbacks: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 3 model keys × 2 outcomes
        let completions_total = IntCounterVec::new(
            Opts::new(
                "chatrelay_completions_total",
                "Total completion calls by model key and outcome",
            ),
            &["model", "outcome"],
        )?;

        let completion_duration = HistogramVec::new(
            HistogramOpts::new(
                "chatrelay_completion_duration_seconds",
                "Completion call latency in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["model"],
        )?;

        // Unrecognized labels share one "unrecognized" value; raw model output never becomes a label
        let routing_decisions = IntCounterVec::new(
            Opts::new(
                "chatrelay_routing_decisions_total",
                "Total routing decisions by classification label",
            ),
            &["label"],
        )?;

        let prompt_fallbacks = IntCounterVec::new(
            Opts::new(
                "chatrelay_prompt_fallbacks_total",
                "Total times a prompt was unavailable and its fallback text was used",
            ),
            &["prompt"],
        )?;

        registry.register(Box::new(completions_total.clone()))?;
        registry.register(Box::new(completion_duration.clone()))?;
        registry.register(Box::new(routing_decisions.clone()))?;
        registry.register(Box::new(prompt_fallbacks.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            completions_total,
            completion_duration,
            routing_decisions,
            prompt_fallbacks,
        })
    }

    /// Record one completion call
    pub fn record_completion(&self, model: ModelKey, success: bool, elapsed: Duration) {
        let outcome = if success { "success" } else { "failure" };
        self.completions_total
            .with_label_values(&[model.as_str(), outcome])
            .inc();
        self.completion_duration
            .with_label_values(&[model.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_routing_decision(&self, label: &ClassificationLabel) {
        self.routing_decisions
            .with_label_values(&[label.metric_label()])
            .inc();
    }

    pub fn record_prompt_fallback(&self, prompt: PromptName) {
        self.prompt_fallbacks
            .with_label_values(&[prompt.identifier()])
            .inc();
    }

    pub fn completions_count(&self, model: ModelKey, outcome: &str) -> u64 {
        self.completions_total
            .with_label_values(&[model.as_str(), outcome])
            .get()
    }

    pub fn routing_decisions_count(&self, label: &str) -> u64 {
        self.routing_decisions.with_label_values(&[label]).get()
    }

    pub fn prompt_fallbacks_count(&self, prompt: PromptName) -> u64 {
        self.prompt_fallbacks
            .with_label_values(&[prompt.identifier()])
            .get()
    }

    /// Gather all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the output is not valid UTF-8.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics output is not UTF-8: {}", e)))
    }
}
