//! Error types for the core crates' fallible surfaces.

use thiserror::Error;

/// Errors reported by the session registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

/// Errors reported while loading the FAQ index from disk.
#[derive(Debug, Error)]
pub enum FaqError {
    #[error("failed to read FAQ file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse FAQ file: {0}")]
    Parse(#[from] serde_json::Error),
}
