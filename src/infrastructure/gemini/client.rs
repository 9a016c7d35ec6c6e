use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Response};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::errors::GeminiApiError;
use super::retry::RetryPolicy;
use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::domain::models::Config;
use crate::domain::ports::{GenerativeModel, SamplingConfig};
use crate::domain::HyperResult;
use crate::infrastructure::logging::secret_scrubbing::{mask_key, scrub};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini HTTP client
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Transport-level request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiClientConfig {
    /// Client settings from the loaded configuration and a resolved key.
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: config.gemini.base_url.clone(),
            model: config.gemini.model.clone(),
            max_retries: config.retry.max_retries,
            initial_backoff_ms: config.retry.initial_backoff_ms,
            max_backoff_ms: config.retry.max_backoff_ms,
            timeout_secs: config.gemini.call_timeout_secs,
        }
    }
}

/// HTTP client for the Gemini `generateContent` API
///
/// Connection pooling comes from the shared reqwest client; transient
/// failures (429, 5xx, network) are retried with exponential backoff.
pub struct GeminiClient {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    retry_policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, GeminiApiError> {
        info!(
            base_url = %config.base_url,
            model = %config.model,
            timeout_secs = config.timeout_secs,
            api_key = %mask_key(&config.api_key),
            "initializing Gemini client"
        );

        let mut key_value = header::HeaderValue::from_str(&config.api_key)
            .map_err(|e| GeminiApiError::InvalidRequest(format!("Invalid API key header: {e}")))?;
        key_value.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_value);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            retry_policy: RetryPolicy::new(
                config.max_retries,
                config.initial_backoff_ms,
                config.max_backoff_ms,
            ),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one request with retries and return the raw response.
    #[instrument(skip(self, request), fields(model = %self.model))]
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        let result = self
            .retry_policy
            .execute(|| self.execute_request(request))
            .await;

        match &result {
            Ok(response) => {
                if let Some(usage) = &response.usage_metadata {
                    info!(
                        prompt_tokens = usage.prompt_token_count,
                        output_tokens = usage.candidates_token_count,
                        "generateContent succeeded"
                    );
                }
            }
            Err(err) => error!(error = %err, "generateContent failed"),
        }
        result
    }

    /// Generate and return the text of the first candidate.
    pub async fn generate_text(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, GeminiApiError> {
        let request = GenerateContentRequest::from_prompt(prompt, sampling);
        let response = self.generate_content(&request).await?;
        response.text().ok_or_else(|| {
            let reason = response
                .block_reason()
                .map_or_else(|| "no candidate text".to_string(), |r| format!("blocked: {r}"));
            GeminiApiError::EmptyResponse(reason)
        })
    }

    async fn execute_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        let url = self.endpoint();
        debug!(url = %url, "POST");
        let response = self.http_client.post(&url).json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<GenerateContentResponse, GeminiApiError> {
        let status = response.status();
        debug!(status = %status, "response status");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let body = scrub(&body);
            warn!(status = %status, body = %body, "Gemini API error");
            return Err(GeminiApiError::from_status(status, body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str, sampling: &SamplingConfig) -> HyperResult<String> {
        Ok(self.generate_text(prompt, sampling).await?)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeminiClientConfig {
        GeminiClientConfig::from_config(&Config::default(), "test-key")
    }

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new(config()).unwrap();
        assert_eq!(client.model_name(), "gemini-1.5-flash");
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut cfg = config();
        cfg.base_url = "http://localhost:9999/".to_string();
        let client = GeminiClient::new(cfg).unwrap();
        assert!(client.endpoint().starts_with("http://localhost:9999/v1beta/"));
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let mut cfg = config();
        cfg.api_key = "bad\nkey".to_string();
        assert!(matches!(
            GeminiClient::new(cfg),
            Err(GeminiApiError::InvalidRequest(_))
        ));
    }
}
