//! Environment checks and service-account setup.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::path::Path;

use crate::cli::output::{emit, table::TableFormatter};
use crate::infrastructure::credentials::{EnvReport, ServiceAccountKey};

/// Handle check-env command
///
/// Fails when the required API key is missing.
pub fn check(json: bool) -> Result<()> {
    let report = EnvReport::collect();
    emit(&report, json, |r| TableFormatter::new().format_env_report(r))?;
    if !report.is_ready() {
        bail!("GEMINI_API_KEY is not set");
    }
    Ok(())
}

/// Handle setup-credentials command
pub fn setup_credentials(dir: &Path, json: bool) -> Result<()> {
    let key = ServiceAccountKey::from_env().context("Failed to load service account key")?;
    let path = key
        .install(dir)
        .context("Failed to install service account key")?;

    let summary = json!({
        "path": path.display().to_string(),
        "projectId": key.project_id(),
    });
    emit(&summary, json, |_| {
        format!("Wrote Google credentials to {}", path.display())
    })
}
