use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::Config;
use crate::infrastructure::http::HttpServer;

use super::build_service;

/// Handle serve command
pub async fn execute(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }

    let (service, _guard) = build_service(config)?;
    info!(
        model = %config.gemini.model,
        strategy = config.extraction.strategy.as_str(),
        "starting hyperexplainer"
    );

    HttpServer::new(Arc::new(service), server_config)
        .serve_with_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}
