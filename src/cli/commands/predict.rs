use anyhow::Result;

use crate::cli::output::progress::{spinner_for, ProgressBarExt};
use crate::cli::output::{emit, table::TableFormatter};
use crate::domain::models::Config;

use super::build_service;

/// Handle predict command
pub async fn execute(config: &Config, name: &str, value: &str, json: bool) -> Result<()> {
    let (service, _guard) = build_service(config)?;
    let spinner = spinner_for(format!("Predicting impact of {name}..."), json);
    let prediction = service.predict(name, value).await;
    spinner.finish_success("Prediction ready");

    emit(&prediction, json, |p| TableFormatter::new().format_prediction(p))
}
