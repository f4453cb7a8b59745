//! Domain types shared across the relay: sessions, roles, and resolutions.

use chrono::{DateTime, Utc};
use frontdesk_store::StoredMessage;
use serde::{Deserialize, Serialize};

/// Identifier for a chat session.
pub type SessionId = String;

/// Speaker of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Stable wire name for the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a stored role name. Unknown names read as [`Role::User`] so
    /// histories written by other builds still load as a conversation.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "assistant" => Role::Assistant,
            _ => Role::User,
        }
    }
}

/// Lifecycle record for one support conversation.
///
/// Lives in the in-memory registry only; the conversation itself is kept
/// separately in the history store and expires on its own TTL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub escalated: bool,
    pub escalation_reason: Option<String>,
    pub escalation_time: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a fresh, unescalated session.
    pub fn new(id: impl Into<SessionId>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            last_activity: now,
            escalated: false,
            escalation_reason: None,
            escalation_time: None,
        }
    }

    /// Refresh the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// A registered session joined with its stored conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub session: Session,
    pub messages: Vec<StoredMessage>,
}

/// How confident the relay is in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// Where a reply's text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Answered verbatim from the FAQ index.
    Faq,
    /// Produced on the generation path; carries the provider name.
    Llm(String),
    /// Local fallback after a provider failure.
    Error,
}

impl Source {
    /// Wire name: `faq`, the provider name, or `error`.
    pub fn as_str(&self) -> &str {
        match self {
            Source::Faq => "faq",
            Source::Llm(provider) => provider,
            Source::Error => "error",
        }
    }

    pub fn is_faq(&self) -> bool {
        matches!(self, Source::Faq)
    }
}

/// Why a conversation was flagged for a human before calling the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    /// The user asked for a person outright or used complaint language.
    CustomerRequest,
    /// Long conversation that keeps circling without an answer.
    UnresolvedIssue,
    /// The last few turns are almost all the user re-asking.
    RepeatedQueries,
}

impl EscalationTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationTrigger::CustomerRequest => "customer_request",
            EscalationTrigger::UnresolvedIssue => "unresolved_issue",
            EscalationTrigger::RepeatedQueries => "repeated_queries",
        }
    }
}

/// Outcome of resolving one user message.
///
/// Transient per-request value; persisting the reply and acting on the
/// escalation flag are the caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub response: String,
    pub source: Source,
    pub confidence: Confidence,
    pub needs_escalation: bool,
    /// Set when the reply came from a FAQ entry.
    pub matched_faq_id: Option<u32>,
    /// Set when escalation was decided before any provider call.
    pub trigger: Option<EscalationTrigger>,
}

#[cfg(test)]
mod tests {
    use super::{Confidence, EscalationTrigger, Role, Session, Source};
    use pretty_assertions::assert_eq;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).expect("encode"), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).expect("encode"),
            "\"assistant\""
        );
    }

    #[test]
    fn unknown_role_names_read_as_user() {
        assert_eq!(Role::parse("assistant"), Role::Assistant);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("system"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn new_sessions_start_unescalated() {
        let session = Session::new("s1");
        assert_eq!(session.id, "s1");
        assert!(!session.escalated);
        assert_eq!(session.escalation_reason, None);
        assert_eq!(session.escalation_time, None);
        assert_eq!(session.created_at, session.last_activity);
    }

    #[test]
    fn session_fields_serialize_camel_case() {
        let encoded = serde_json::to_value(Session::new("s1")).expect("encode");
        assert!(encoded.get("createdAt").is_some());
        assert!(encoded.get("lastActivity").is_some());
        assert!(encoded.get("escalationReason").is_some());
    }

    #[test]
    fn source_wire_names() {
        assert_eq!(Source::Faq.as_str(), "faq");
        assert_eq!(Source::Llm("openai".to_string()).as_str(), "openai");
        assert_eq!(Source::Error.as_str(), "error");
        assert!(Source::Faq.is_faq());
        assert!(!Source::Error.is_faq());
    }

    #[test]
    fn trigger_and_confidence_wire_names() {
        assert_eq!(EscalationTrigger::CustomerRequest.as_str(), "customer_request");
        assert_eq!(EscalationTrigger::UnresolvedIssue.as_str(), "unresolved_issue");
        assert_eq!(EscalationTrigger::RepeatedQueries.as_str(), "repeated_queries");
        assert_eq!(Confidence::High.as_str(), "high");
        assert_eq!(
            serde_json::to_string(&Confidence::Medium).expect("encode"),
            "\"medium\""
        );
    }
}
