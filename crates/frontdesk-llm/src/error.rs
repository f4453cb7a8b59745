//! Error types for text-generation providers.

use thiserror::Error;

/// Errors returned by [`TextGenerator`](crate::TextGenerator) implementations.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("api key environment variable not set: {0}")]
    MissingApiKey(String),
}
