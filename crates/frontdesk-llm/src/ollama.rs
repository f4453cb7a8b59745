//! Ollama chat adapter for locally hosted models.

use crate::error::GeneratorError;
use crate::generator::{ChatTurn, TextGenerator, WireMessage, build_wire_messages};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default Ollama host.
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
/// Default model name.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// [`TextGenerator`] backed by an Ollama server's `/api/chat` endpoint.
pub struct OllamaGenerator {
    client: Client,
    host: String,
    model: String,
}

impl OllamaGenerator {
    /// Create an adapter for the given host and model.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            host: host.into(),
            model: model.into(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host.trim_end_matches('/'))
    }
}

impl Default for OllamaGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GeneratorError> {
        let request = OllamaChatRequest {
            model: &self.model,
            messages: build_wire_messages(system, history, message),
            stream: false,
        };
        debug!(
            "requesting completion (provider=ollama, model={}, messages={})",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OllamaChatResponse = response.json().await?;
        parsed
            .message
            .map(|message| message.content)
            .ok_or_else(|| GeneratorError::MalformedResponse("no message in response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::{OllamaChatRequest, OllamaChatResponse, OllamaGenerator};
    use crate::generator::build_wire_messages;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let generator = OllamaGenerator::new("http://localhost:11434/", "llama3.1");
        assert_eq!(generator.chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn request_disables_streaming() {
        let request = OllamaChatRequest {
            model: "llama3.1",
            messages: build_wire_messages("system", &[], "hello"),
            stream: false,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["stream"], false);
        assert_eq!(value["model"], "llama3.1");
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn response_parses_message_content() {
        let response: OllamaChatResponse =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"hi"},"done":true}"#)
                .expect("parse");
        assert_eq!(response.message.expect("message").content, "hi");
    }
}
