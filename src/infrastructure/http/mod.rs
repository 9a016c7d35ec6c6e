//! HTTP adapter (axum)

pub mod handlers;
pub mod server;

pub use handlers::ErrorResponse;
pub use server::{router, HttpServer};
