//! Domain layer for hyperexplainer
//!
//! Records, error taxonomy and the generative-model port. No I/O lives here.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{HyperError, HyperResult};
