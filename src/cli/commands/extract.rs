use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::Path;

use crate::cli::output::progress::{spinner_for, ProgressBarExt};
use crate::cli::output::{emit, table::TableFormatter};
use crate::domain::models::{to_value_map, Config, ExtractedParameters, ExtractionStrategy};
use crate::services::{heuristic_scorer, pattern_extractor};

use super::build_service;

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read code from stdin")?;
            Ok(code)
        }
    }
}

/// Handle extract command
///
/// Only the model strategy needs credentials.
pub async fn execute(
    config: &Config,
    file: Option<&Path>,
    strategy: Option<&str>,
    json: bool,
) -> Result<()> {
    let strategy = match strategy {
        Some(raw) => ExtractionStrategy::parse(raw)
            .ok_or_else(|| anyhow!("Unknown strategy '{raw}' (expected pattern, heuristic or model)"))?,
        None => config.extraction.strategy,
    };
    let code = read_source(file)?;

    let params: ExtractedParameters = match strategy {
        ExtractionStrategy::Pattern => pattern_extractor::extract(&code),
        ExtractionStrategy::Heuristic => heuristic_scorer::extract(&code),
        ExtractionStrategy::Model => {
            let (service, _guard) = build_service(config)?;
            let spinner = spinner_for("Asking the model for hyperparameters...", json);
            let params = service.extract(&code, Some(strategy)).await;
            spinner.finish_success(format!("Found {} hyperparameters", params.len()));
            params
        }
    };

    emit(&to_value_map(&params), json, |_| {
        TableFormatter::new().format_parameters(&params)
    })
}
