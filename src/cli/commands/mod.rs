//! CLI command implementations.

pub mod correlate;
pub mod env;
pub mod explain;
pub mod extract;
pub mod predict;
pub mod serve;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::{self, CredentialsGuard};
use crate::infrastructure::gemini::{GeminiClient, GeminiClientConfig};
use crate::services::HyperparameterService;

/// Load configuration from `path`, or the project hierarchy when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Install the API credential and wire the pipeline around a Gemini client.
///
/// The returned guard must outlive every use of the service.
pub fn build_service(config: &Config) -> Result<(HyperparameterService, CredentialsGuard)> {
    let guard = credentials::initialize(config)
        .context("Gemini API key is required (set GEMINI_API_KEY or gemini.api_key)")?;
    let client = GeminiClient::new(GeminiClientConfig::from_config(config, credentials::api_key()?))
        .context("Failed to create Gemini client")?;
    Ok((HyperparameterService::new(Arc::new(client), config), guard))
}
