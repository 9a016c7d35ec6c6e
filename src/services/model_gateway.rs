//! Time-bounded access to the generative model.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::models::GeminiConfig;
use crate::domain::ports::{GenerativeModel, SamplingConfig};
use crate::domain::{HyperError, HyperResult};

/// Shared handle used by every service that calls the model.
///
/// Every call is wrapped in a timeout; an overrun is an external call failure.
#[derive(Clone)]
pub struct ModelGateway {
    model: Arc<dyn GenerativeModel>,
    sampling: SamplingConfig,
    timeout: Duration,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn GenerativeModel>, sampling: SamplingConfig, timeout: Duration) -> Self {
        Self {
            model,
            sampling,
            timeout,
        }
    }

    pub fn from_config(model: Arc<dyn GenerativeModel>, config: &GeminiConfig) -> Self {
        Self::new(
            model,
            config.sampling.clone(),
            Duration::from_secs(config.call_timeout_secs),
        )
    }

    pub const fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Call with the configured sampling.
    pub async fn call(&self, prompt: &str) -> HyperResult<String> {
        self.call_with(prompt, &self.sampling).await
    }

    /// Call with explicit sampling.
    pub async fn call_with(&self, prompt: &str, sampling: &SamplingConfig) -> HyperResult<String> {
        debug!(
            model = self.model.model_name(),
            prompt_chars = prompt.len(),
            "calling generative model"
        );
        match tokio::time::timeout(self.timeout, self.model.generate(prompt, sampling)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout = ?self.timeout, "generative model call timed out");
                Err(HyperError::ExternalCallFailure(format!(
                    "model call timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("model", &self.model.model_name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::gemini::MockGenerativeModel;

    #[tokio::test]
    async fn test_call_passes_through() {
        let gateway = ModelGateway::new(
            Arc::new(MockGenerativeModel::always("hi")),
            SamplingConfig::default(),
            Duration::from_secs(5),
        );
        assert_eq!(gateway.call("p").await.unwrap(), "hi");
        assert_eq!(gateway.model_name(), "mock");
    }

    #[tokio::test]
    async fn test_overrun_is_external_failure() {
        let mock = MockGenerativeModel::always("late").with_delay(Duration::from_millis(200));
        let gateway = ModelGateway::new(
            Arc::new(mock),
            SamplingConfig::default(),
            Duration::from_millis(20),
        );
        let err = gateway.call("p").await.unwrap_err();
        assert!(matches!(err, HyperError::ExternalCallFailure(ref m) if m.contains("timed out")));
    }
}
