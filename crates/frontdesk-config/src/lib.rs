//! Configuration models and loading for the frontdesk relay.
//!
//! This crate owns the config schema, JSON5 loading, and validation used by
//! the server and by components constructed from config.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Configuration schema models.
pub use model::*;
