//! Store doubles for failure-path tests.

use async_trait::async_trait;
use frontdesk_store::{KeyValueStore, StoreError};

/// Store double where every operation fails.
#[derive(Debug, Default)]
pub struct FailingKvStore;

impl FailingKvStore {
    pub fn new() -> Self {
        Self
    }

    fn down() -> StoreError {
        StoreError::Backend("store is down".to_string())
    }
}

#[async_trait]
impl KeyValueStore for FailingKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(Self::down())
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
        Err(Self::down())
    }

    async fn del(&self, _key: &str) -> Result<bool, StoreError> {
        Err(Self::down())
    }

    async fn keys(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(Self::down())
    }
}
