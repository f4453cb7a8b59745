//! Hand-off detection on both sides of a conversation turn.
//!
//! Two pure checks share one configured phrase vocabulary: a pre-provider
//! scan of the user's message and recent turn shape, and a post-provider
//! scan of the generated reply for hedging or hand-off language. Neither
//! holds state.

use crate::types::EscalationTrigger;
use frontdesk_config::EscalationConfig;
use frontdesk_store::StoredMessage;

/// Phrase and turn-shape thresholds for spotting conversations that need a
/// person.
pub struct EscalationDetector {
    user_phrases: Vec<String>,
    response_phrases: Vec<String>,
    long_conversation_turns: usize,
    repetition_window: usize,
    repetition_min_user_turns: usize,
}

impl EscalationDetector {
    /// Build a detector from config. Phrases are lowercased once here so
    /// scans stay case-insensitive regardless of how they were written.
    pub fn new(config: &EscalationConfig) -> Self {
        Self {
            user_phrases: lowercase_all(&config.user_phrases),
            response_phrases: lowercase_all(&config.response_phrases),
            long_conversation_turns: config.long_conversation_turns,
            repetition_window: config.repetition_window,
            repetition_min_user_turns: config.repetition_min_user_turns,
        }
    }

    /// Decide, before any provider call, whether this turn should go to a
    /// human instead.
    ///
    /// Fires when the message itself asks for a person (or uses complaint
    /// language), or when the conversation has grown past the length
    /// threshold while the user keeps re-asking within the repetition
    /// window. `history` is the prior conversation, without the message
    /// under inspection.
    pub fn detect_trigger(
        &self,
        message: &str,
        history: &[StoredMessage],
    ) -> Option<EscalationTrigger> {
        let lowered = message.to_lowercase();
        if self
            .user_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
        {
            return Some(EscalationTrigger::CustomerRequest);
        }

        let long_conversation = history.len() > self.long_conversation_turns;
        let repeating = history.len() > self.repetition_window
            && recent_user_turns(history, self.repetition_window) >= self.repetition_min_user_turns;
        if long_conversation && repeating {
            return Some(EscalationTrigger::UnresolvedIssue);
        }
        None
    }

    /// True when generated text hedges or hands off, honoring the system
    /// instruction's contract to say so literally.
    pub fn response_requests_handoff(&self, response: &str) -> bool {
        let lowered = response.to_lowercase();
        self.response_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }
}

fn lowercase_all(phrases: &[String]) -> Vec<String> {
    phrases.iter().map(|phrase| phrase.to_lowercase()).collect()
}

fn recent_user_turns(history: &[StoredMessage], window: usize) -> usize {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .filter(|message| message.role == "user")
        .count()
}

#[cfg(test)]
mod tests {
    use super::EscalationDetector;
    use crate::types::EscalationTrigger;
    use chrono::Utc;
    use frontdesk_config::EscalationConfig;
    use frontdesk_store::StoredMessage;
    use pretty_assertions::assert_eq;

    fn detector() -> EscalationDetector {
        EscalationDetector::new(&EscalationConfig::default())
    }

    fn msg(role: &str, content: &str) -> StoredMessage {
        StoredMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn asking_for_a_manager_triggers_customer_request() {
        let trigger = detector().detect_trigger("I want to speak to a manager right now", &[]);
        assert_eq!(trigger, Some(EscalationTrigger::CustomerRequest));
    }

    #[test]
    fn keyword_scan_is_case_insensitive() {
        let trigger = detector().detect_trigger("PLEASE ESCALATE THIS TO SOMEONE", &[]);
        assert_eq!(trigger, Some(EscalationTrigger::CustomerRequest));
    }

    #[test]
    fn ordinary_questions_do_not_trigger() {
        assert_eq!(detector().detect_trigger("Where is my order?", &[]), None);
        assert_eq!(detector().detect_trigger("", &[]), None);
    }

    #[test]
    fn long_repetitive_conversations_read_as_unresolved() {
        let mut history = Vec::new();
        for turn in 0..5 {
            history.push(msg("user", &format!("question {turn}")));
            if turn < 2 {
                history.push(msg("assistant", "an answer"));
            }
        }
        history.push(msg("user", "asking once more"));
        history.push(msg("user", "still waiting"));
        // 9 prior messages, and the last four are all user turns.
        assert_eq!(history.len(), 9);
        let trigger = detector().detect_trigger("any update?", &history);
        assert_eq!(trigger, Some(EscalationTrigger::UnresolvedIssue));
    }

    #[test]
    fn long_but_balanced_conversations_do_not_trigger() {
        let mut history = Vec::new();
        for turn in 0..5 {
            history.push(msg("user", &format!("question {turn}")));
            history.push(msg("assistant", &format!("answer {turn}")));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(detector().detect_trigger("one more question", &history), None);
    }

    #[test]
    fn repetition_alone_is_not_enough_below_the_length_threshold() {
        let history = vec![
            msg("user", "where is it"),
            msg("user", "where is it?"),
            msg("user", "hello?"),
            msg("user", "anyone there"),
            msg("user", "hello again"),
        ];
        assert_eq!(detector().detect_trigger("hello???", &history), None);
    }

    #[test]
    fn custom_phrase_lists_replace_the_defaults() {
        let config = EscalationConfig {
            user_phrases: vec!["talk to a person".to_string()],
            ..EscalationConfig::default()
        };
        let detector = EscalationDetector::new(&config);
        assert_eq!(
            detector.detect_trigger("can I talk to a person please", &[]),
            Some(EscalationTrigger::CustomerRequest)
        );
        // The default keyword list no longer applies.
        assert_eq!(detector.detect_trigger("I want a manager", &[]), None);
    }

    #[test]
    fn hedging_replies_request_handoff() {
        let detector = detector();
        assert!(detector.response_requests_handoff(
            "I'm not sure. Let me connect you with a human agent."
        ));
        assert!(detector.response_requests_handoff("I am NOT SURE about that one."));
        assert!(!detector.response_requests_handoff(
            "Standard shipping takes 5-7 business days."
        ));
        assert!(!detector.response_requests_handoff(""));
    }
}
