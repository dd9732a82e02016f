//! Classification labels produced by the first-pass model call

use super::ModelKey;
use std::fmt;

/// Label returned by the classification call
///
/// Parsing trims surrounding whitespace and lowercases before matching, so
/// `" Complex\n"` and `"complex"` are the same label. Anything outside the
/// closed set is kept verbatim in `Unrecognized` for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationLabel {
    Chat,
    Search,
    Complex,
    Context,
    Unrecognized(String),
}

impl ClassificationLabel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "chat" => Self::Chat,
            "search" => Self::Search,
            "complex" => Self::Complex,
            "context" => Self::Context,
            _ => Self::Unrecognized(raw.to_string()),
        }
    }

    /// Model configuration this label routes to
    pub fn target(&self) -> ModelKey {
        match self {
            Self::Search => ModelKey::Search,
            Self::Complex => ModelKey::Reason,
            Self::Chat | Self::Context | Self::Unrecognized(_) => ModelKey::Chat,
        }
    }

    /// Bounded label value for metrics (raw unrecognized text is never a label)
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Search => "search",
            Self::Complex => "complex",
            Self::Context => "context",
            Self::Unrecognized(_) => "unrecognized",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<&str> for ClassificationLabel {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized(raw) => write!(f, "unrecognized({:?})", raw),
            other => f.write_str(other.metric_label()),
        }
    }
}
