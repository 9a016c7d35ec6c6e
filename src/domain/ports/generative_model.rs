//! Generative Model Port
//!
//! Abstraction over the external text-generation API. The core pipeline only
//! ever sees a prompt going in and free text coming out; the adapter owns the
//! wire format, authentication and transport retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::HyperResult;

/// Sampling parameters sent with every generate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SamplingConfig {
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff (0.0 - 1.0]
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

const fn default_temperature() -> f32 {
    0.2
}

const fn default_top_p() -> f32 {
    0.8
}

const fn default_top_k() -> u32 {
    40
}

const fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl SamplingConfig {
    /// Same configuration with a different temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// External text-generation call.
///
/// Implementations must map every transport, authentication or quota problem
/// to `HyperError::ExternalCallFailure`.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate free text for `prompt`.
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> HyperResult<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
