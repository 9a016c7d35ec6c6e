//! Domain models: request-scoped records produced by the pipeline.

pub mod config;
pub mod correlation;
pub mod explanation;
pub mod parameter;
pub mod prediction;

pub use config::{
    Config, ExplanationConfig, ExtractionConfig, ExtractionStrategy, GeminiConfig, LoggingConfig,
    RetryConfig, ServerConfig,
};
pub use correlation::{
    CorrelationDirection, CorrelationExplanation, CorrelationMatrix, Strength,
    EXPLANATION_THRESHOLD,
};
pub use explanation::{
    AlternativeValue, Complexity, Direction, ExplanationOutcome, ExplanationRecord, REQUIRED_FIELDS,
};
pub use parameter::{
    to_value_map, value_to_text, ExtractedParameters, InferredType, ParameterRecord,
};
pub use prediction::{
    AxisValue, ParameterKind, PerformancePrediction, Series, SeriesPoint, SuggestedValue,
};
