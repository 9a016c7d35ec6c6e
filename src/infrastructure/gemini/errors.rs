use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::HyperError;

/// Errors that can occur when calling the Gemini API
#[derive(Error, Debug)]
pub enum GeminiApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Permission denied or key restricted (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown model or endpoint (HTTP 404)
    #[error("Model or endpoint not found")]
    NotFound,

    /// Quota exhausted (HTTP 429)
    #[error("Rate limit exceeded - quota exhausted")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The response carried no candidate text (blocked prompt, empty parts)
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Unexpected status code
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl GeminiApiError {
    /// Classify a non-success status and its (already scrubbed) body.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::InvalidApiKey,
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            s if s.is_server_error() => Self::ServerError(s, body),
            s => Self::UnknownError(s, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::NetworkError(_)
        )
    }

    /// Returns true if this is a permanent error that should not be retried
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidApiKey | Self::Forbidden(_) | Self::NotFound
        )
    }
}

impl From<GeminiApiError> for HyperError {
    fn from(err: GeminiApiError) -> Self {
        Self::ExternalCallFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::BAD_REQUEST, "x".into()),
            GeminiApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            GeminiApiError::InvalidApiKey
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            GeminiApiError::RateLimitExceeded
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            GeminiApiError::ServerError(StatusCode::SERVICE_UNAVAILABLE, _)
        ));
        assert!(matches!(
            GeminiApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            GeminiApiError::UnknownError(_, _)
        ));
    }

    #[test]
    fn test_transient_and_permanent_are_exclusive() {
        let transient = GeminiApiError::RateLimitExceeded;
        assert!(transient.is_transient());
        assert!(!transient.is_permanent());

        let permanent = GeminiApiError::Forbidden("key restricted".into());
        assert!(permanent.is_permanent());
        assert!(!permanent.is_transient());

        let empty = GeminiApiError::EmptyResponse("blocked".into());
        assert!(!empty.is_transient());
        assert!(!empty.is_permanent());
    }

    #[test]
    fn test_maps_to_external_call_failure() {
        let err: HyperError = GeminiApiError::InvalidApiKey.into();
        assert_eq!(err.code(), "EXTERNAL_CALL_FAILURE");
    }
}
