//! Hyperparameter HTTP server.
//!
//! Thin JSON adapter over [`HyperparameterService`]. Only `/explain` can
//! fail upstream; prediction and correlation always answer.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::domain::models::ServerConfig;
use crate::services::HyperparameterService;

pub struct HttpServer {
    config: ServerConfig,
    service: Arc<HyperparameterService>,
}

impl HttpServer {
    pub const fn new(service: Arc<HyperparameterService>, config: ServerConfig) -> Self {
        Self { config, service }
    }

    /// Build the router.
    pub fn build_router(&self) -> Router {
        router(Arc::clone(&self.service), self.config.enable_cors)
    }

    fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .with_context(|| {
                format!("Invalid bind address {}:{}", self.config.host, self.config.port)
            })
    }

    /// Start the server.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let app = self.build_router();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(%addr, cors = self.config.enable_cors, "hyperexplainer HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;
        info!("HTTP server stopped");
        Ok(())
    }
}

/// All routes over a shared service.
pub fn router(service: Arc<HyperparameterService>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/extract", post(handlers::extract))
        .route("/explain", post(handlers::explain))
        .route("/explain/batch", post(handlers::explain_batch))
        .route("/predict", post(handlers::predict))
        .route("/correlate", post(handlers::correlate))
        .route("/health", get(handlers::health_check))
        .with_state(service);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}
