//! Request/response types and route handlers.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::domain::models::{
    to_value_map, value_to_text, CorrelationMatrix, ExplanationOutcome, ExplanationRecord,
    ExtractionStrategy, PerformancePrediction,
};
use crate::domain::HyperError;
use crate::services::HyperparameterService;

pub type AppState = Arc<HyperparameterService>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    fn from_error(status: StatusCode, err: &HyperError) -> ApiError {
        (
            status,
            Json(Self {
                error: err.to_string(),
                code: err.code().to_string(),
            }),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub code: String,
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Shared by `/explain` and `/predict`. `value` may be any JSON scalar.
#[derive(Debug, Deserialize)]
pub struct ParameterRequest {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct BatchExplainRequest {
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelateRequest {
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub parameter_names: Option<Vec<String>>,
}

impl CorrelateRequest {
    /// `parameters` wins when both forms are present; bare names carry no value.
    fn into_pairs(self) -> Vec<(String, String)> {
        match (self.parameters, self.parameter_names) {
            (Some(parameters), _) => pairs(&parameters),
            (None, Some(names)) => names.into_iter().map(|n| (n, String::new())).collect(),
            (None, None) => Vec::new(),
        }
    }
}

fn pairs(parameters: &Map<String, Value>) -> Vec<(String, String)> {
    parameters
        .iter()
        .map(|(name, value)| (name.clone(), value_to_text(value)))
        .collect()
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ErrorResponse::from_error(
            StatusCode::BAD_REQUEST,
            &HyperError::InvalidInput("parameter name is required".to_string()),
        ));
    }
    Ok(())
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn extract(
    State(service): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let strategy = match req.strategy.as_deref() {
        None => None,
        Some(raw) => Some(ExtractionStrategy::parse(raw).ok_or_else(|| {
            ErrorResponse::from_error(
                StatusCode::BAD_REQUEST,
                &HyperError::InvalidInput(format!("unknown extraction strategy: {raw}")),
            )
        })?),
    };
    let params = service.extract(&req.code, strategy).await;
    Ok(Json(to_value_map(&params)))
}

pub async fn explain(
    State(service): State<AppState>,
    Json(req): Json<ParameterRequest>,
) -> Result<Json<ExplanationRecord>, ApiError> {
    require_name(&req.name)?;
    service
        .explain(&req.name, &value_to_text(&req.value))
        .await
        .map(Json)
        .map_err(|err| {
            warn!(name = %req.name, error = %err, "explanation request failed");
            ErrorResponse::from_error(StatusCode::BAD_GATEWAY, &err)
        })
}

pub async fn explain_batch(
    State(service): State<AppState>,
    Json(req): Json<BatchExplainRequest>,
) -> Json<Vec<ExplanationOutcome>> {
    Json(service.explain_all(&pairs(&req.parameters)).await)
}

pub async fn predict(
    State(service): State<AppState>,
    Json(req): Json<ParameterRequest>,
) -> Result<Json<PerformancePrediction>, ApiError> {
    require_name(&req.name)?;
    Ok(Json(
        service
            .predict(&req.name, &value_to_text(&req.value))
            .await,
    ))
}

pub async fn correlate(
    State(service): State<AppState>,
    Json(req): Json<CorrelateRequest>,
) -> Json<CorrelationMatrix> {
    Json(service.correlate(&req.into_pairs()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_correlate_request_forms() {
        let req: CorrelateRequest =
            serde_json::from_value(json!({"parameters": {"lr": 0.1, "epochs": 5}})).unwrap();
        assert_eq!(
            req.into_pairs(),
            vec![
                ("lr".to_string(), "0.1".to_string()),
                ("epochs".to_string(), "5".to_string())
            ]
        );

        let req: CorrelateRequest =
            serde_json::from_value(json!({"parameterNames": ["a", "b"]})).unwrap();
        assert_eq!(
            req.into_pairs(),
            vec![("a".to_string(), String::new()), ("b".to_string(), String::new())]
        );

        let req: CorrelateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.into_pairs().is_empty());
    }

    #[test]
    fn test_parameter_request_accepts_scalars() {
        for (value, text) in [(json!(32), "32"), (json!("adam"), "adam"), (json!(true), "true")] {
            let req: ParameterRequest =
                serde_json::from_value(json!({"name": "p", "value": value})).unwrap();
            assert_eq!(value_to_text(&req.value), text);
        }
    }
}
