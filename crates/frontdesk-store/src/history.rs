//! Per-session conversation history on top of a key-value store.
//!
//! Histories live under `session:<id>:history` as a JSON array of message
//! objects with a time-to-live refreshed on every write. Store failures are
//! recovered locally: reads fall back to an empty history and writes report
//! failure through logging, so a flaky backend degrades the conversation to
//! context-less instead of erroring.

use crate::kv::KeyValueStore;
use chrono::{DateTime, Utc};
use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const SESSION_KEY_PREFIX: &str = "session:";
const HISTORY_KEY_SUFFIX: &str = ":history";

/// Build the storage key for a session's history.
pub fn history_key(session_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{session_id}{HISTORY_KEY_SUFFIX}")
}

/// Extract the session id from a history storage key.
pub fn session_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(SESSION_KEY_PREFIX)?
        .strip_suffix(HISTORY_KEY_SUFFIX)
}

/// Persisted message record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredMessage {
    /// Role name, `user` or `assistant`.
    pub role: String,
    /// Message content.
    pub content: String,
    /// Timestamp for the message.
    pub timestamp: DateTime<Utc>,
}

/// Ordered per-session message log with expiry.
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    ttl_secs: u64,
    /// Per-session append locks, keyed by session id.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl HistoryStore {
    /// Create a history store over the given backend with a per-write TTL.
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl_secs: u64) -> Self {
        Self {
            kv,
            ttl_secs,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Append a message and return the updated history.
    ///
    /// Appends for the same session id are serialized so concurrent turns
    /// cannot lose updates in the read-modify-write cycle. The lock is held
    /// only around store access, never across caller-side awaits.
    pub async fn append(&self, session_id: &str, role: &str, content: &str) -> Vec<StoredMessage> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut messages = self.load(session_id).await;
        messages.push(StoredMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        self.persist(session_id, &messages).await;
        messages
    }

    /// Fetch the full history for a session, empty if absent or lapsed.
    pub async fn history(&self, session_id: &str) -> Vec<StoredMessage> {
        self.load(session_id).await
    }

    /// Fetch the last `limit` messages in original order.
    pub async fn tail(&self, session_id: &str, limit: usize) -> Vec<StoredMessage> {
        let mut messages = self.load(session_id).await;
        let keep_from = messages.len().saturating_sub(limit);
        messages.split_off(keep_from)
    }

    /// Remove the stored history. Returns true when something was removed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let key = history_key(session_id);
        let removed = match self.kv.del(&key).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!("failed to delete history (session_id={}, err={})", session_id, err);
                false
            }
        };
        self.locks.lock().remove(session_id);
        removed
    }

    /// List the session ids currently holding history.
    pub async fn list_session_ids(&self) -> Vec<String> {
        match self.kv.keys(SESSION_KEY_PREFIX).await {
            Ok(keys) => keys
                .iter()
                .filter_map(|key| session_id_from_key(key))
                .map(str::to_string)
                .collect(),
            Err(err) => {
                warn!("failed to list histories (err={})", err);
                Vec::new()
            }
        }
    }

    fn session_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(session_id.to_string()).or_default().clone()
    }

    async fn load(&self, session_id: &str) -> Vec<StoredMessage> {
        let key = history_key(session_id);
        match self.kv.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(messages) => messages,
                Err(err) => {
                    warn!(
                        "discarding corrupt history (session_id={}, err={})",
                        session_id, err
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(
                    "history store unavailable (session_id={}, err={})",
                    session_id, err
                );
                Vec::new()
            }
        }
    }

    async fn persist(&self, session_id: &str, messages: &[StoredMessage]) {
        let key = history_key(session_id);
        let encoded = match serde_json::to_string(messages) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!("failed to encode history (session_id={}, err={})", session_id, err);
                return;
            }
        };
        if let Err(err) = self.kv.set_ex(&key, &encoded, self.ttl_secs).await {
            warn!("failed to persist history (session_id={}, err={})", session_id, err);
        }
    }
}
