//! Configuration loading
//!
//! Hierarchical configuration using figment: programmatic defaults, project
//! YAML files, then `HYPEREXPLAINER_*` environment overrides. Every loaded
//! configuration is validated before use.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
