//! The response-resolution pipeline.
//!
//! One canonical path per user message: FAQ lookup first, then a pre-call
//! hand-off check over the user's message and recent turns, then a bounded
//! provider call whose reply is scanned for hedging. Provider failures stay
//! inside the pipeline as a deterministic fallback resolution; `resolve`
//! never errors and never writes history.

mod prompt;

pub use prompt::summarize_conversation;

use crate::escalation::EscalationDetector;
use crate::faq::FaqIndex;
use crate::types::{Confidence, Resolution, Role, Source};
use frontdesk_config::FrontdeskConfig;
use frontdesk_llm::{ChatTurn, TextGenerator};
use frontdesk_store::{HistoryStore, StoredMessage};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Fixed reply for conversations routed to a person before any provider
/// call.
pub const HANDOFF_RESPONSE: &str = "I understand this is important to you. Let me connect you \
     with a human agent who can better assist you with this matter. Please hold while I \
     transfer you to our support team.";

/// Fixed reply when the provider fails or times out.
pub const FALLBACK_RESPONSE: &str = "I'm having trouble. Let me transfer you to a human agent.";

/// Resolves one user message into a reply plus escalation signals.
pub struct Resolver {
    faq: Arc<FaqIndex>,
    history: Arc<HistoryStore>,
    generator: Arc<dyn TextGenerator>,
    detector: EscalationDetector,
    match_threshold: u32,
    context_window: usize,
    call_timeout: Duration,
}

impl Resolver {
    pub fn new(
        faq: Arc<FaqIndex>,
        history: Arc<HistoryStore>,
        generator: Arc<dyn TextGenerator>,
        config: &FrontdeskConfig,
    ) -> Self {
        Self {
            faq,
            history,
            generator,
            detector: EscalationDetector::new(&config.escalation),
            match_threshold: config.faq.match_threshold,
            context_window: config.llm.context_window,
            call_timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }

    /// Override the provider call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Resolve a user message against the FAQ index, the hand-off
    /// heuristics, and finally the provider.
    ///
    /// Infallible: provider errors and timeouts come back as a fallback
    /// resolution with `needs_escalation` set. Persisting the user turn and
    /// the returned reply is the caller's job.
    pub async fn resolve(&self, session_id: &str, message: &str) -> Resolution {
        if let Some(hit) = self.faq.best_match(message, self.match_threshold) {
            debug!(
                "faq answer (session_id={}, faq_id={}, score={})",
                session_id, hit.entry.id, hit.score
            );
            return Resolution {
                response: hit.entry.answer.clone(),
                source: Source::Faq,
                confidence: Confidence::High,
                needs_escalation: false,
                matched_faq_id: Some(hit.entry.id),
                trigger: None,
            };
        }

        let context = self.context(session_id, message).await;

        if let Some(trigger) = self.detector.detect_trigger(message, &context) {
            info!(
                "hand-off before provider call (session_id={}, trigger={})",
                session_id,
                trigger.as_str()
            );
            return Resolution {
                response: HANDOFF_RESPONSE.to_string(),
                source: Source::Llm(self.generator.name().to_string()),
                confidence: Confidence::High,
                needs_escalation: true,
                matched_faq_id: None,
                trigger: Some(trigger),
            };
        }

        let system = prompt::build_system_instruction(&context);
        let turns: Vec<ChatTurn> = context.iter().map(chat_turn).collect();
        let reply = tokio::time::timeout(
            self.call_timeout,
            self.generator.generate(&system, &turns, message),
        )
        .await;

        match reply {
            Ok(Ok(text)) => {
                let hedged = self.detector.response_requests_handoff(&text);
                Resolution {
                    response: text,
                    source: Source::Llm(self.generator.name().to_string()),
                    confidence: if hedged { Confidence::Low } else { Confidence::Medium },
                    needs_escalation: hedged,
                    matched_faq_id: None,
                    trigger: None,
                }
            }
            Ok(Err(err)) => {
                warn!(
                    "provider call failed (session_id={}, provider={}, err={})",
                    session_id,
                    self.generator.name(),
                    err
                );
                self.fallback()
            }
            Err(_) => {
                warn!(
                    "provider call timed out (session_id={}, provider={}, timeout_secs={})",
                    session_id,
                    self.generator.name(),
                    self.call_timeout.as_secs()
                );
                self.fallback()
            }
        }
    }

    /// Bounded prior context for the heuristics and the provider call.
    ///
    /// The caller records the inbound user turn before resolving, so a
    /// trailing copy of the message under resolution is dropped; the window
    /// then covers the turns before it.
    async fn context(&self, session_id: &str, message: &str) -> Vec<StoredMessage> {
        let mut tail = self.history.tail(session_id, self.context_window + 1).await;
        if let Some(last) = tail.last()
            && last.role == Role::User.as_str()
            && last.content == message
        {
            tail.pop();
        } else if tail.len() > self.context_window {
            tail.remove(0);
        }
        tail
    }

    fn fallback(&self) -> Resolution {
        Resolution {
            response: FALLBACK_RESPONSE.to_string(),
            source: Source::Error,
            confidence: Confidence::Low,
            needs_escalation: true,
            matched_faq_id: None,
            trigger: None,
        }
    }
}

fn chat_turn(message: &StoredMessage) -> ChatTurn {
    match Role::parse(&message.role) {
        Role::User => ChatTurn::user(message.content.clone()),
        Role::Assistant => ChatTurn::assistant(message.content.clone()),
    }
}
