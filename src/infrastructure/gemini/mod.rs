//! Gemini `generateContent` adapter for the `GenerativeModel` port.

pub mod client;
pub mod errors;
pub mod mock;
pub mod retry;
pub mod types;

pub use client::{GeminiClient, GeminiClientConfig};
pub use errors::GeminiApiError;
pub use mock::{MockGenerativeModel, MockReply};
pub use retry::RetryPolicy;
