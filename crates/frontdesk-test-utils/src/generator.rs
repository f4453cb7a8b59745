//! Provider doubles for exercising the resolver without a network.

use async_trait::async_trait;
use frontdesk_llm::{ChatTurn, GeneratorError, TextGenerator};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Arguments captured from one `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorCall {
    pub system: String,
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// Provider double answering every call with a fixed reply.
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    name: String,
    response: String,
}

impl FixedGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "fixed".to_string(),
            response: response.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl TextGenerator for FixedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _message: &str,
    ) -> Result<String, GeneratorError> {
        Ok(self.response.clone())
    }
}

/// Provider double that records every call it sees.
#[derive(Debug, Clone)]
pub struct RecordingGenerator {
    response: String,
    calls: Arc<Mutex<Vec<GeneratorCall>>>,
}

impl RecordingGenerator {
    /// Build the double plus a handle to the captured calls.
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<GeneratorCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GeneratorError> {
        self.calls.lock().push(GeneratorCall {
            system: system.to_string(),
            history: history.to_vec(),
            message: message.to_string(),
        });
        Ok(self.response.clone())
    }
}

/// Provider double failing every call.
#[derive(Debug, Clone)]
pub struct FailingGenerator {
    message: String,
}

impl FailingGenerator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _message: &str,
    ) -> Result<String, GeneratorError> {
        Err(GeneratorError::Api {
            status: 500,
            message: self.message.clone(),
        })
    }
}

/// Provider double that sleeps before answering, for timeout paths.
#[derive(Debug, Clone)]
pub struct SlowGenerator {
    delay: Duration,
    response: String,
}

impl SlowGenerator {
    pub fn new(delay: Duration, response: impl Into<String>) -> Self {
        Self {
            delay,
            response: response.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for SlowGenerator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate(
        &self,
        _system: &str,
        _history: &[ChatTurn],
        _message: &str,
    ) -> Result<String, GeneratorError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}
