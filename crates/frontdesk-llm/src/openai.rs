//! OpenAI-compatible chat-completions adapter.

use crate::error::GeneratorError;
use crate::generator::{ChatTurn, TextGenerator, WireMessage, build_wire_messages};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

/// Default chat-completions endpoint.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default completion budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// [`TextGenerator`] backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiGenerator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    /// Create an adapter with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: DEFAULT_OPENAI_API_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create an adapter reading the API key from the named environment
    /// variable.
    pub fn from_env(api_key_env: &str, model: impl Into<String>) -> Result<Self, GeneratorError> {
        let api_key = env::var(api_key_env)
            .map_err(|_| GeneratorError::MissingApiKey(api_key_env.to_string()))?;
        Ok(Self::new(api_key, model))
    }

    /// Override the API endpoint, for compatible providers and test servers.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the sampling parameters.
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<String, GeneratorError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
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

        let parsed: ChatCompletionResponse = response.json().await?;
        extract_reply(parsed)
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GeneratorError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: build_wire_messages(system, history, message),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            "requesting completion (provider=openai, model={}, messages={})",
            self.model,
            request.messages.len()
        );
        self.send_request(&request).await
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn extract_reply(response: ChatCompletionResponse) -> Result<String, GeneratorError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GeneratorError::MalformedResponse("no content in choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ChatCompletionRequest, ChatCompletionResponse, extract_reply};
    use crate::error::GeneratorError;
    use crate::generator::{ChatTurn, build_wire_messages};
    use pretty_assertions::assert_eq;

    #[test]
    fn request_serializes_to_the_chat_completions_shape() {
        let history = vec![ChatTurn::user("hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: build_wire_messages("system prompt", &history, "question"),
            temperature: 0.7,
            max_tokens: 300,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["temperature"], 0.7_f32);
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["messages"][2]["role"], "user");
    }

    #[test]
    fn extract_reply_returns_the_first_choice() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"hello there"}}]}"#)
                .expect("parse");
        assert_eq!(extract_reply(response).expect("reply"), "hello there");
    }

    #[test]
    fn extract_reply_rejects_empty_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).expect("parse");
        match extract_reply(response) {
            Err(GeneratorError::MalformedResponse(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn extract_reply_rejects_null_content() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).expect("parse");
        assert!(extract_reply(response).is_err());
    }
}
