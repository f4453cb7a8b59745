//! Durable storage for the frontdesk relay.
//!
//! Provides the expiring [`KeyValueStore`] abstraction with in-memory and
//! file-backed implementations, plus the [`HistoryStore`] that keeps each
//! session's ordered conversation log under `session:<id>:history`.

pub mod error;
pub mod file;
pub mod history;
pub mod kv;

pub use error::StoreError;
pub use file::FileKvStore;
pub use history::{HistoryStore, StoredMessage, history_key, session_id_from_key};
pub use kv::{KeyValueStore, MemoryKvStore};
