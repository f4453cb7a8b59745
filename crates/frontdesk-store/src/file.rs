//! File-backed key-value store, one JSON envelope per key.

use crate::error::StoreError;
use crate::kv::{KeyValueStore, expiry_after};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk envelope for a single entry.
///
/// The original key is kept inside the envelope because file names are
/// sanitized and cannot be mapped back to keys.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    expires_at: DateTime<Utc>,
    value: String,
}

/// [`KeyValueStore`] persisting each entry as a JSON file under a root
/// directory. Writes go through a temp file and a rename.
pub struct FileKvStore {
    /// Root directory holding the entry files.
    root: PathBuf,
    /// Serialize write access to entry files.
    write_lock: Mutex<()>,
}

impl FileKvStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized file kv store (root={})", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Build the entry file path for a key.
    fn entry_path(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{sanitized}.json"))
    }

    /// Read and decode the envelope at a path, if any.
    fn read_entry(path: &Path) -> Result<StoredEntry, StoreError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let entry = Self::read_entry(&path)?;
        if entry.expires_at <= Utc::now() {
            debug!("dropping lapsed entry (key={})", key);
            let _ = fs::remove_file(&path);
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let entry = StoredEntry {
            key: key.to_string(),
            expires_at: expiry_after(ttl_secs),
            value: value.to_string(),
        };
        let encoded = serde_json::to_string(&entry)?;
        let _guard = self.write_lock.lock();
        let target = self.entry_path(key);
        let temp = target.with_extension("json.tmp");
        fs::write(&temp, encoded)?;
        if target.exists() {
            fs::remove_file(&target)?;
        }
        fs::rename(&temp, &target)?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.entry_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now = Utc::now();
        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let entry = match Self::read_entry(&path) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry (path={}, err={})", path.display(), err);
                    continue;
                }
            };
            if entry.expires_at > now && entry.key.starts_with(prefix) {
                keys.push(entry.key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::FileKvStore;
    use crate::kv::KeyValueStore;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let temp = tempdir().expect("tempdir");
        let store = FileKvStore::new(temp.path()).expect("store");
        store
            .set_ex("session:abc:history", "[1,2]", 60)
            .await
            .expect("set");
        assert_eq!(
            store.get("session:abc:history").await.expect("get"),
            Some("[1,2]".to_string())
        );
    }

    #[tokio::test]
    async fn lapsed_entry_reads_as_absent_and_is_purged() {
        let temp = tempdir().expect("tempdir");
        let store = FileKvStore::new(temp.path()).expect("store");
        store.set_ex("alpha", "one", 0).await.expect("set");
        assert_eq!(store.get("alpha").await.expect("get"), None);
        assert_eq!(store.keys("").await.expect("keys"), Vec::<String>::new());
    }

    #[tokio::test]
    async fn keys_recovers_original_keys_from_envelopes() {
        let temp = tempdir().expect("tempdir");
        let store = FileKvStore::new(temp.path()).expect("store");
        store.set_ex("session:a:history", "[]", 60).await.expect("set");
        store.set_ex("session:b:history", "[]", 60).await.expect("set");
        store.set_ex("config:x", "{}", 60).await.expect("set");
        assert_eq!(
            store.keys("session:").await.expect("keys"),
            vec!["session:a:history".to_string(), "session:b:history".to_string()]
        );
    }

    #[tokio::test]
    async fn del_removes_the_backing_file() {
        let temp = tempdir().expect("tempdir");
        let store = FileKvStore::new(temp.path()).expect("store");
        store.set_ex("alpha", "one", 60).await.expect("set");
        assert_eq!(store.del("alpha").await.expect("del"), true);
        assert_eq!(store.del("alpha").await.expect("del again"), false);
        assert_eq!(store.get("alpha").await.expect("get"), None);
    }

    #[tokio::test]
    async fn store_survives_reopen() {
        let temp = tempdir().expect("tempdir");
        {
            let store = FileKvStore::new(temp.path()).expect("store");
            store.set_ex("alpha", "persisted", 60).await.expect("set");
        }
        let reopened = FileKvStore::new(temp.path()).expect("reopen");
        assert_eq!(
            reopened.get("alpha").await.expect("get"),
            Some("persisted".to_string())
        );
    }
}
