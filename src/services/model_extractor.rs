//! Prompt-driven extraction through the generative model.

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::models::{ExtractedParameters, InferredType, ParameterRecord};
use crate::domain::HyperResult;
use crate::services::model_gateway::ModelGateway;
use crate::services::prompts;
use crate::services::response_normalizer::ResponseNormalizer;

pub struct ModelExtractor {
    gateway: ModelGateway,
    normalizer: ResponseNormalizer,
}

impl ModelExtractor {
    pub fn new(gateway: ModelGateway) -> Self {
        Self {
            gateway,
            normalizer: ResponseNormalizer::default(),
        }
    }

    /// Ask the model for the hyperparameters in `code`.
    ///
    /// Never fails: call or parse problems are logged and yield an empty mapping.
    pub async fn extract(&self, code: &str) -> ExtractedParameters {
        match self.try_extract(code).await {
            Ok(params) => params,
            Err(err) => {
                warn!(error = %err, code = err.code(), "model extraction failed, returning empty mapping");
                ExtractedParameters::new()
            }
        }
    }

    async fn try_extract(&self, code: &str) -> HyperResult<ExtractedParameters> {
        let raw = self.gateway.call(&prompts::extraction_prompt(code)).await?;
        let object = self
            .normalizer
            .normalize(&raw)
            .map_err(|e| e.into_parse_failure(&raw))?;

        let params: ExtractedParameters = object
            .iter()
            .map(|(name, value)| (name.clone(), record_from_json(name, value)))
            .collect();
        info!(count = params.len(), model = self.gateway.model_name(), "model extraction complete");
        Ok(params)
    }
}

/// Type a model-supplied value by its JSON type.
pub fn record_from_json(name: &str, value: &Value) -> ParameterRecord {
    match value {
        Value::String(s) => ParameterRecord::new(name, s.clone(), InferredType::String),
        Value::Number(n) if n.is_i64() || n.is_u64() => {
            ParameterRecord::new(name, n.to_string(), InferredType::Int)
        }
        Value::Number(n) => ParameterRecord::new(name, n.to_string(), InferredType::Float),
        Value::Bool(b) => ParameterRecord::new(name, b.to_string(), InferredType::Bool),
        other => ParameterRecord::new(name, other.to_string(), InferredType::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SamplingConfig;
    use crate::infrastructure::gemini::MockGenerativeModel;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn extractor(mock: MockGenerativeModel) -> ModelExtractor {
        ModelExtractor::new(ModelGateway::new(
            Arc::new(mock),
            SamplingConfig::default(),
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_fenced_response_is_typed() {
        let reply = "```json\n{\"learning_rate\": 0.001, \"epochs\": 10, \"optimizer\": \"adam\", \"shuffle\": true}\n```";
        let params = extractor(MockGenerativeModel::always(reply))
            .extract("model.fit(...)")
            .await;
        assert_eq!(params.len(), 4);
        assert_eq!(params["learning_rate"].inferred_type(), InferredType::Float);
        assert_eq!(params["epochs"].inferred_type(), InferredType::Int);
        assert_eq!(params["optimizer"].raw_value(), "adam");
        assert_eq!(params["shuffle"].inferred_type(), InferredType::Bool);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty() {
        let params = extractor(MockGenerativeModel::failing("quota"))
            .extract("x = 1")
            .await;
        assert!(params.is_empty());

        let params = extractor(MockGenerativeModel::always("no idea"))
            .extract("x = 1")
            .await;
        assert!(params.is_empty());
    }

    #[test]
    fn test_nested_values_serialised() {
        let record = record_from_json("layers", &json!([64, 32]));
        assert_eq!(record.raw_value(), "[64,32]");
        assert_eq!(record.inferred_type(), InferredType::String);
    }
}
