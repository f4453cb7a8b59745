//! The text-generation capability consumed by the response resolver.

use crate::error::GeneratorError;
use async_trait::async_trait;
use serde::Serialize;

/// Speaker of a conversation turn sent to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Wire-format role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One prior conversation turn passed to a provider as context.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Build a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// External text-generation provider.
///
/// Implementations perform one network call per [`generate`](Self::generate)
/// invocation and report transport or provider failures through
/// [`GeneratorError`]; callers own retries, timeouts, and fallbacks.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider name, reported as the source of generated replies.
    fn name(&self) -> &str;

    /// Generate a reply to `message` given a system instruction and prior
    /// turns.
    async fn generate(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GeneratorError>;
}

/// Chat message in the shape both provider APIs accept.
#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Flatten a request into the provider message list: system instruction
/// first, then prior turns, then the new user message.
pub(crate) fn build_wire_messages<'a>(
    system: &'a str,
    history: &'a [ChatTurn],
    message: &'a str,
) -> Vec<WireMessage<'a>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(WireMessage {
        role: "system",
        content: system,
    });
    for turn in history {
        messages.push(WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        });
    }
    messages.push(WireMessage {
        role: "user",
        content: message,
    });
    messages
}

#[cfg(test)]
mod tests {
    use super::{ChatRole, ChatTurn, build_wire_messages};
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_messages_keep_request_order() {
        let history = vec![ChatTurn::user("hello"), ChatTurn::assistant("hi, how can I help?")];
        let messages = build_wire_messages("be helpful", &history, "where is my order?");

        let flattened: Vec<(&str, &str)> = messages
            .iter()
            .map(|message| (message.role, message.content))
            .collect();
        assert_eq!(
            flattened,
            vec![
                ("system", "be helpful"),
                ("user", "hello"),
                ("assistant", "hi, how can I help?"),
                ("user", "where is my order?"),
            ]
        );
    }

    #[test]
    fn wire_messages_without_history() {
        let messages = build_wire_messages("system", &[], "first contact");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn chat_roles_map_to_wire_names() {
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
