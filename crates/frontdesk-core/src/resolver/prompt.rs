//! Text assembly for provider calls and escalation summaries.

use crate::types::Role;
use frontdesk_store::StoredMessage;

/// Render prior turns as a plain transcript, one `Speaker: text` line per
/// message.
pub(crate) fn build_transcript(history: &[StoredMessage]) -> String {
    history
        .iter()
        .map(|message| {
            let speaker = match Role::parse(&message.role) {
                Role::User => "Customer",
                Role::Assistant => "Agent",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the system instruction for a provider call.
///
/// Embeds the bounded transcript and tells the model to answer with a
/// literal hand-off sentence when it is not confident; the reply scan
/// afterwards looks for exactly that language.
pub(crate) fn build_system_instruction(history: &[StoredMessage]) -> String {
    format!(
        "You are a helpful customer support assistant. \
         Use this chat history for reference: {}. \
         If you cannot answer confidently based on the context, say: \
         \"I'm not sure. Let me connect you with a human agent.\"",
        build_transcript(history)
    )
}

/// Numbered digest of a conversation, used when announcing an escalation to
/// operators.
pub fn summarize_conversation(history: &[StoredMessage]) -> String {
    if history.is_empty() {
        return "No conversation history available.".to_string();
    }

    let lines = history
        .iter()
        .enumerate()
        .map(|(idx, message)| {
            let speaker = match Role::parse(&message.role) {
                Role::User => "Customer",
                Role::Assistant => "Bot",
            };
            format!("{}. {speaker}: {}", idx + 1, message.content)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Conversation Summary:\n{lines}\n\nTotal messages: {}",
        history.len()
    )
}

#[cfg(test)]
mod tests {
    use super::{build_system_instruction, build_transcript, summarize_conversation};
    use chrono::Utc;
    use frontdesk_store::StoredMessage;
    use pretty_assertions::assert_eq;

    fn msg(role: &str, content: &str) -> StoredMessage {
        StoredMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn transcripts_label_both_speakers() {
        let history = vec![
            msg("user", "where is my order?"),
            msg("assistant", "let me check"),
        ];
        assert_eq!(
            build_transcript(&history),
            "Customer: where is my order?\nAgent: let me check"
        );
        assert_eq!(build_transcript(&[]), "");
    }

    #[test]
    fn unknown_roles_render_as_the_customer() {
        let history = vec![msg("system", "noise")];
        assert_eq!(build_transcript(&history), "Customer: noise");
    }

    #[test]
    fn system_instruction_embeds_transcript_and_handoff_contract() {
        let history = vec![msg("user", "my parcel is late")];
        let system = build_system_instruction(&history);
        assert!(system.starts_with("You are a helpful customer support assistant."));
        assert!(system.contains("Use this chat history for reference: Customer: my parcel is late."));
        assert!(system.contains("\"I'm not sure. Let me connect you with a human agent.\""));
    }

    #[test]
    fn summaries_number_turns_and_count_messages() {
        let history = vec![
            msg("user", "hi"),
            msg("assistant", "hello"),
            msg("user", "my parcel is late"),
        ];
        assert_eq!(
            summarize_conversation(&history),
            "Conversation Summary:\n1. Customer: hi\n2. Bot: hello\n3. Customer: my parcel is late\n\nTotal messages: 3"
        );
    }

    #[test]
    fn empty_conversations_summarize_to_a_placeholder() {
        assert_eq!(summarize_conversation(&[]), "No conversation history available.");
    }
}
