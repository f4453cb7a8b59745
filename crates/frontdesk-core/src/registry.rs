//! In-memory session lifecycle tracking.
//!
//! The registry owns session metadata only; conversations live in the
//! history store under their own TTL. The two can disagree transiently, a
//! restart drops the registry while durable history survives, and an idle
//! session's history can lapse first. Callers treat missing history as an
//! empty conversation.

use crate::error::RegistryError;
use crate::types::{ActiveSession, Session, SessionId};
use chrono::{DateTime, Duration, Utc};
use frontdesk_store::HistoryStore;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of an escalation request against a known session.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalateOutcome {
    /// The flag was set by this call.
    Escalated(Session),
    /// The session was flagged earlier; the original reason and time stand.
    AlreadyEscalated(Session),
}

/// Map of live sessions keyed by id, shared across request handlers.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
    history: Arc<HistoryStore>,
}

impl SessionRegistry {
    pub fn new(history: Arc<HistoryStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            history,
        }
    }

    /// Register a fresh session under the given id.
    pub fn create(&self, id: &str) -> Session {
        let session = Session::new(id);
        let mut sessions = self.sessions.write();
        if sessions.insert(id.to_string(), session.clone()).is_some() {
            warn!("replacing existing session (id={})", id);
        }
        debug!("created session (id={})", id);
        session
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().get(id).cloned()
    }

    /// Fetch a session, creating it on first contact. Existing sessions get
    /// their activity timestamp refreshed.
    pub fn get_or_create(&self, id: &str) -> Session {
        let mut sessions = self.sessions.write();
        match sessions.get_mut(id) {
            Some(session) => {
                session.touch();
                session.clone()
            }
            None => {
                debug!("created session on first contact (id={})", id);
                let session = Session::new(id);
                sessions.insert(id.to_string(), session.clone());
                session
            }
        }
    }

    /// Flag a session for a human. Setting the flag is one-shot: repeated
    /// calls report [`EscalateOutcome::AlreadyEscalated`] and keep the
    /// original reason and time.
    pub fn escalate(&self, id: &str, reason: &str) -> Result<EscalateOutcome, RegistryError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownSession(id.to_string()))?;
        if session.escalated {
            return Ok(EscalateOutcome::AlreadyEscalated(session.clone()));
        }
        session.escalated = true;
        session.escalation_reason = Some(reason.to_string());
        session.escalation_time = Some(Utc::now());
        info!("session escalated (id={}, reason={})", id, reason);
        Ok(EscalateOutcome::Escalated(session.clone()))
    }

    /// Whether the session exists and carries the escalation flag.
    pub fn is_escalated(&self, id: &str) -> bool {
        self.sessions
            .read()
            .get(id)
            .map(|session| session.escalated)
            .unwrap_or(false)
    }

    /// Remove a session and its stored history. Returns true when either
    /// side had something to remove.
    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id).is_some();
        let had_history = self.history.delete(id).await;
        if removed {
            debug!("deleted session (id={})", id);
        }
        removed || had_history
    }

    /// Every registered session joined with its current conversation,
    /// oldest first.
    pub async fn list_active(&self) -> Vec<ActiveSession> {
        let mut sessions: Vec<Session> = self.sessions.read().values().cloned().collect();
        sessions.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut active = Vec::with_capacity(sessions.len());
        for session in sessions {
            let messages = self.history.history(&session.id).await;
            active.push(ActiveSession { session, messages });
        }
        active
    }

    /// Drop sessions idle for longer than `max_age` and return their ids.
    /// Stored history is left to lapse on its own TTL.
    pub fn sweep_expired(&self, max_age: Duration) -> Vec<SessionId> {
        self.sweep_expired_at(Utc::now(), max_age)
    }

    fn sweep_expired_at(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<SessionId> {
        let mut sessions = self.sessions.write();
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, session)| now - session.last_activity > max_age)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::{EscalateOutcome, SessionRegistry};
    use crate::error::RegistryError;
    use chrono::{Duration, Utc};
    use frontdesk_store::{HistoryStore, MemoryKvStore};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn registry() -> (SessionRegistry, Arc<HistoryStore>) {
        let history = Arc::new(HistoryStore::new(Arc::new(MemoryKvStore::new()), 60));
        (SessionRegistry::new(history.clone()), history)
    }

    #[test]
    fn create_then_get_round_trips() {
        let (registry, _) = registry();
        let created = registry.create("s1");
        let fetched = registry.get("s1").expect("session exists");
        assert_eq!(fetched, created);
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn get_or_create_refreshes_activity() {
        let (registry, _) = registry();
        let first = registry.get_or_create("s1");
        let second = registry.get_or_create("s1");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.last_activity >= first.last_activity);
    }

    #[test]
    fn escalation_is_one_shot() {
        let (registry, _) = registry();
        registry.create("s1");
        assert!(!registry.is_escalated("s1"));

        match registry.escalate("s1", "User requested human assistance") {
            Ok(EscalateOutcome::Escalated(session)) => {
                assert!(session.escalated);
                assert_eq!(
                    session.escalation_reason.as_deref(),
                    Some("User requested human assistance")
                );
                assert!(session.escalation_time.is_some());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(registry.is_escalated("s1"));

        match registry.escalate("s1", "a different reason") {
            Ok(EscalateOutcome::AlreadyEscalated(session)) => {
                assert_eq!(
                    session.escalation_reason.as_deref(),
                    Some("User requested human assistance")
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn escalating_an_unknown_session_errors() {
        let (registry, _) = registry();
        match registry.escalate("ghost", "reason") {
            Err(RegistryError::UnknownSession(id)) => assert_eq!(id, "ghost"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!registry.is_escalated("ghost"));
    }

    #[tokio::test]
    async fn delete_removes_session_and_history() {
        let (registry, history) = registry();
        registry.create("s1");
        history.append("s1", "user", "hello").await;

        assert!(registry.delete("s1").await);
        assert_eq!(registry.get("s1"), None);
        assert!(history.history("s1").await.is_empty());
        assert!(!registry.delete("s1").await);
    }

    #[tokio::test]
    async fn delete_reports_removal_when_only_history_exists() {
        let (registry, history) = registry();
        history.append("orphan", "user", "hello").await;
        assert!(registry.delete("orphan").await);
        assert!(!registry.delete("orphan").await);
    }

    #[tokio::test]
    async fn list_active_enriches_with_history() {
        let (registry, history) = registry();
        registry.create("a");
        registry.create("b");
        history.append("a", "user", "hello").await;
        history.append("a", "assistant", "hi").await;

        let active = registry.list_active().await;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].session.id, "a");
        assert_eq!(active[0].messages.len(), 2);
        assert_eq!(active[1].session.id, "b");
        assert!(active[1].messages.is_empty());
    }

    #[test]
    fn sweep_drops_only_sessions_past_the_age_limit() {
        let (registry, _) = registry();
        registry.create("s1");
        registry.create("s2");

        let fresh = registry.sweep_expired_at(Utc::now() + Duration::hours(23), Duration::hours(24));
        assert!(fresh.is_empty());
        assert!(registry.get("s1").is_some());

        let mut swept =
            registry.sweep_expired_at(Utc::now() + Duration::hours(25), Duration::hours(24));
        swept.sort();
        assert_eq!(swept, vec!["s1".to_string(), "s2".to_string()]);
        assert_eq!(registry.get("s1"), None);
        assert_eq!(registry.get("s2"), None);
    }
}
