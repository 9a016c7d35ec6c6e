//! Common test utilities for integration tests
//!
//! Shared fixtures for the Gemini wire format and service construction.

#![allow(dead_code)]

use std::sync::Arc;

use hyperexplainer::domain::ports::GenerativeModel;
use hyperexplainer::infrastructure::gemini::{GeminiClient, GeminiClientConfig};
use hyperexplainer::{Config, HyperparameterService};
use serde_json::{json, Value};

pub const TEST_API_KEY: &str = "test-api-key";

/// A `generateContent` response carrying `text` in one candidate.
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 34, "totalTokenCount": 46}
    })
}

/// Path the client posts to for the configured model.
pub fn generate_path(config: &Config) -> String {
    format!("/v1beta/models/{}:generateContent", config.gemini.model)
}

/// Configuration pointed at a mock server with fast retries.
pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.gemini.base_url = base_url.to_string();
    config.gemini.call_timeout_secs = 5;
    config.retry.max_retries = 2;
    config.retry.initial_backoff_ms = 10;
    config.retry.max_backoff_ms = 50;
    config
}

pub fn client_for(config: &Config) -> GeminiClient {
    GeminiClient::new(GeminiClientConfig::from_config(config, TEST_API_KEY))
        .expect("client builds")
}

pub fn service_with(model: Arc<dyn GenerativeModel>) -> HyperparameterService {
    HyperparameterService::new(model, &Config::default())
}

/// A complete explanation object as the model would return it.
pub fn explanation_json() -> Value {
    json!({
        "importance": "Controls the optimizer step size.",
        "definition": "Scale applied to each gradient update.",
        "currentValueAnalysis": "0.01 is a common starting point.",
        "alternativeValues": [
            {"value": "0.001", "direction": "lower", "effect": "Slower, steadier training", "complexity": "basic"},
            {"value": "0.1", "direction": "higher", "effect": "Faster but may diverge", "complexity": "advanced"}
        ],
        "bestPractices": "Use a warmup schedule.",
        "tradeOffs": "Speed against stability.",
        "impactVisualization": "Loss curves flatten or oscillate."
    })
}
