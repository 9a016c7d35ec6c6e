//! Domain errors for the hyperexplainer pipeline.

use thiserror::Error;

/// Domain-level errors surfaced by the core pipeline.
///
/// "No parameters found" is deliberately absent: an empty extraction is an
/// empty mapping, not an error.
#[derive(Debug, Error)]
pub enum HyperError {
    #[error("External call failed: {0}")]
    ExternalCallFailure(String),

    #[error("Could not parse model response: {reason}")]
    ParseFailure { reason: String, raw: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl HyperError {
    /// Build a parse failure, keeping a bounded preview of the raw text.
    pub fn parse_failure(reason: impl Into<String>, raw: &str) -> Self {
        let preview: String = raw.chars().take(500).collect();
        Self::ParseFailure {
            reason: reason.into(),
            raw: preview,
        }
    }

    /// Stable machine-readable code used by the HTTP layer.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ExternalCallFailure(_) => "EXTERNAL_CALL_FAILURE",
            Self::ParseFailure { .. } => "PARSE_FAILURE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

pub type HyperResult<T> = Result<T, HyperError>;

impl From<serde_json::Error> for HyperError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure {
            reason: err.to_string(),
            raw: String::new(),
        }
    }
}
