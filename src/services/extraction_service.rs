//! Strategy dispatch for hyperparameter extraction.

use tracing::{debug, info, instrument};

use crate::domain::models::{ExtractedParameters, ExtractionStrategy};
use crate::services::model_extractor::ModelExtractor;
use crate::services::{heuristic_scorer, pattern_extractor};

pub struct ExtractionService {
    default_strategy: ExtractionStrategy,
    model_extractor: ModelExtractor,
}

impl ExtractionService {
    pub const fn new(default_strategy: ExtractionStrategy, model_extractor: ModelExtractor) -> Self {
        Self {
            default_strategy,
            model_extractor,
        }
    }

    pub const fn default_strategy(&self) -> ExtractionStrategy {
        self.default_strategy
    }

    /// Extract with `strategy`, or the configured default.
    ///
    /// An empty result is not an error.
    #[instrument(skip(self, code), fields(code_chars = code.len()))]
    pub async fn extract(
        &self,
        code: &str,
        strategy: Option<ExtractionStrategy>,
    ) -> ExtractedParameters {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let params = match strategy {
            ExtractionStrategy::Pattern => pattern_extractor::extract(code),
            ExtractionStrategy::Heuristic => heuristic_scorer::extract(code),
            ExtractionStrategy::Model => self.model_extractor.extract(code).await,
        };

        if params.is_empty() {
            info!(strategy = strategy.as_str(), "no hyperparameters found");
        } else {
            debug!(strategy = strategy.as_str(), count = params.len(), "extracted hyperparameters");
        }
        params
    }
}
