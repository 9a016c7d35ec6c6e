//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Gemini API client (the `GenerativeModel` implementation) and a scripted mock
//! - HTTP adapter (axum)
//! - Configuration management
//! - Logging infrastructure
//! - Credentials management
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod credentials;
pub mod gemini;
pub mod http;
pub mod logging;
