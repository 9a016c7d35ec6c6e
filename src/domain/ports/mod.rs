//! Domain ports (interfaces)
//!
//! Traits implemented by the infrastructure layer.

pub mod generative_model;

pub use generative_model::{GenerativeModel, SamplingConfig};
