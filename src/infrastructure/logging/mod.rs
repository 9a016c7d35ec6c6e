//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, with an optional
//! daily-rotated JSON file and regex-based secret scrubbing for anything
//! echoed from the external API.

pub mod logger;
pub mod secret_scrubbing;

pub use logger::LoggerImpl;
pub use secret_scrubbing::{mask_key, scrub, SecretScrubber};
