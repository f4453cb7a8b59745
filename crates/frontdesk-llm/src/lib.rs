//! Text-generation providers for the frontdesk relay.
//!
//! Defines the [`TextGenerator`] capability the resolver delegates to, with
//! adapters for OpenAI-compatible APIs and locally hosted Ollama servers.
//! Providers are selected once at startup by configuration; the resolver
//! only sees the trait.

pub mod error;
pub mod generator;
pub mod ollama;
pub mod openai;

pub use error::GeneratorError;
pub use generator::{ChatRole, ChatTurn, TextGenerator};
pub use ollama::{DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL, OllamaGenerator};
pub use openai::{DEFAULT_OPENAI_API_URL, OpenAiGenerator};
