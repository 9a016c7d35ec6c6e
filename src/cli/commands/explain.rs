use anyhow::{Context, Result};

use crate::cli::output::progress::{spinner_for, ProgressBarExt};
use crate::cli::output::{emit, table::TableFormatter};
use crate::domain::models::Config;

use super::build_service;

/// Handle explain command
pub async fn execute(config: &Config, name: &str, value: &str, json: bool) -> Result<()> {
    let (service, _guard) = build_service(config)?;
    let spinner = spinner_for(format!("Explaining {name}..."), json);

    let record = match service.explain(name, value).await {
        Ok(record) => {
            spinner.finish_success("Explanation ready");
            record
        }
        Err(err) => {
            spinner.finish_error("Explanation failed");
            return Err(err).with_context(|| format!("Failed to explain {name}"));
        }
    };

    emit(&record, json, |r| {
        TableFormatter::new().format_explanation(name, value, r)
    })
}
