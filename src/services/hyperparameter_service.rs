//! Single entry point used by the HTTP handlers and the CLI.

use std::sync::Arc;

use crate::domain::models::{
    Config, CorrelationMatrix, ExplanationOutcome, ExplanationRecord, ExtractedParameters,
    ExtractionStrategy, PerformancePrediction,
};
use crate::domain::ports::GenerativeModel;
use crate::domain::HyperResult;
use crate::services::correlation_service::CorrelationService;
use crate::services::explanation_synthesizer::ExplanationSynthesizer;
use crate::services::extraction_service::ExtractionService;
use crate::services::model_extractor::ModelExtractor;
use crate::services::model_gateway::ModelGateway;
use crate::services::prediction_service::PredictionService;

/// Wires every pipeline stage around one shared model handle.
pub struct HyperparameterService {
    extraction: ExtractionService,
    synthesizer: ExplanationSynthesizer,
    prediction: PredictionService,
    correlation: CorrelationService,
}

impl HyperparameterService {
    pub fn new(model: Arc<dyn GenerativeModel>, config: &Config) -> Self {
        let gateway = ModelGateway::from_config(model, &config.gemini);
        Self {
            extraction: ExtractionService::new(
                config.extraction.strategy,
                ModelExtractor::new(gateway.clone()),
            ),
            synthesizer: ExplanationSynthesizer::new(
                gateway.clone(),
                config.explanation.max_concurrent_calls,
            ),
            prediction: PredictionService::new(gateway.clone()),
            correlation: CorrelationService::new(gateway),
        }
    }

    pub async fn extract(
        &self,
        code: &str,
        strategy: Option<ExtractionStrategy>,
    ) -> ExtractedParameters {
        self.extraction.extract(code, strategy).await
    }

    pub async fn explain(&self, name: &str, value: &str) -> HyperResult<ExplanationRecord> {
        self.synthesizer.explain(name, value).await
    }

    pub async fn explain_all(&self, parameters: &[(String, String)]) -> Vec<ExplanationOutcome> {
        self.synthesizer.explain_all(parameters).await
    }

    pub async fn predict(&self, name: &str, value: &str) -> PerformancePrediction {
        self.prediction.predict(name, value).await
    }

    pub async fn correlate(&self, parameters: &[(String, String)]) -> CorrelationMatrix {
        self.correlation.correlate(parameters).await
    }

    pub const fn default_strategy(&self) -> ExtractionStrategy {
        self.extraction.default_strategy()
    }
}
