//! Service layer: the extraction, explanation, prediction and correlation
//! pipeline built on the generative-model port.

pub mod correlation_service;
pub mod explanation_synthesizer;
pub mod extraction_service;
pub mod fallback_generator;
pub mod heuristic_scorer;
pub mod hyperparameter_service;
pub mod json_repair;
pub mod model_extractor;
pub mod model_gateway;
pub mod pattern_extractor;
pub mod prediction_service;
pub mod prompts;
pub mod response_normalizer;

pub use correlation_service::CorrelationService;
pub use explanation_synthesizer::ExplanationSynthesizer;
pub use extraction_service::ExtractionService;
pub use hyperparameter_service::HyperparameterService;
pub use model_extractor::ModelExtractor;
pub use model_gateway::ModelGateway;
pub use prediction_service::PredictionService;
pub use response_normalizer::ResponseNormalizer;
