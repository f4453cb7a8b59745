//! Key-value storage abstraction with per-entry expiry.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Durable key-value store with expiring entries.
///
/// Every value carries a time-to-live set on write; a lapsed entry reads
/// back as absent. Implementations must be safe to share across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value stored under `key`, if present and not lapsed.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Store `value` under `key` with a time-to-live in seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;
    /// Remove the value stored under `key`. Returns true when a live value
    /// was removed.
    async fn del(&self, key: &str) -> Result<bool, StoreError>;
    /// List the live keys starting with `prefix`, sorted.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

/// Compute the expiry instant for a freshly written entry.
pub(crate) fn expiry_after(ttl_secs: u64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(ttl_secs as i64)
}

struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory [`KeyValueStore`] used by default and in tests.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // The entry lapsed; purge it so the map does not hold stale data.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key)
            && entry.expires_at <= now
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: expiry_after(ttl_secs),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write();
        match entries.remove(key) {
            Some(entry) => Ok(entry.expires_at > Utc::now()),
            None => Ok(false),
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now = Utc::now();
        let entries = self.entries.read();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| entry.expires_at > now && key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
