use anyhow::Result;

use crate::cli::output::progress::{spinner_for, ProgressBarExt};
use crate::cli::output::{emit, table::TableFormatter};
use crate::domain::models::Config;

use super::build_service;

/// Handle correlate command
pub async fn execute(config: &Config, parameters: &[(String, String)], json: bool) -> Result<()> {
    let (service, _guard) = build_service(config)?;
    let spinner = spinner_for(
        format!("Correlating {} parameters...", parameters.len()),
        json,
    );
    let matrix = service.correlate(parameters).await;
    spinner.finish_success(format!("{} notable pairs", matrix.explanations.len()));

    emit(&matrix, json, |m| TableFormatter::new().format_correlation(m))
}
