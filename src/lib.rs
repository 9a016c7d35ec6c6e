//! hyperexplainer - hyperparameter extraction and explanation service
//!
//! Pulls hyperparameters out of machine-learning training code and uses a
//! generative language model to explain them, predict their performance
//! impact and estimate how they correlate.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Records, error taxonomy and the `GenerativeModel` port
//! - **Service Layer** (`services`): Extraction, normalisation, explanation, prediction, correlation
//! - **Infrastructure Layer** (`infrastructure`): Gemini client, HTTP API, config, logging, credentials
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hyperexplainer::{Config, HyperparameterService};
//! use hyperexplainer::infrastructure::gemini::MockGenerativeModel;
//!
//! # async fn demo() {
//! let model = Arc::new(MockGenerativeModel::always("{}"));
//! let service = HyperparameterService::new(model, &Config::default());
//! let params = service.extract("learning_rate = 0.001", None).await;
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, CorrelationMatrix, ExplanationRecord, ExtractedParameters, ExtractionStrategy,
    LoggingConfig, ParameterRecord, PerformancePrediction, RetryConfig,
};
pub use domain::ports::{GenerativeModel, SamplingConfig};
pub use domain::{HyperError, HyperResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::HyperparameterService;
