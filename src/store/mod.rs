// SPDX-License-Identifier: MPL-2.0

//! Typed access to the local key-value store.
//!
//! Every record lives as a single string under a fixed key, overwritten
//! wholesale on each write. Backends only deal in raw strings; [`LocalStore`]
//! layers the per-record encoding and the decode fallback policy on top.

mod memory;
mod schema;
mod sqlite;
mod tracker;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use tracker::ChangeTracker;

use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("malformed record under {key}: {reason}")]
    Decode { key: &'static str, reason: String },
    #[error("database path error: {0}")]
    Path(String),
}

/// A value change made through a different handle on the same store.
///
/// This is the equivalent of the browser's cross-tab `storage` event: it is
/// never raised for writes made through the handle that observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Raw string key-value backend
pub trait Store {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Remove several keys at once; either all go or none do
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;
    /// All stored pairs, ordered by key
    fn entries(&self) -> Result<Vec<(String, String)>, StoreError>;
    /// Changes written by other handles since the last poll
    fn poll_external(&self) -> Result<Vec<StorageChange>, StoreError>;
}

/// A record persisted under a fixed key
pub trait Record: Sized + Default {
    const KEY: &'static str;

    fn encode(&self) -> Result<String, StoreError>;
    fn decode(raw: &str) -> Result<Self, StoreError>;
}

/// Implements [`Record`] with the JSON codec for a serde type
#[macro_export]
macro_rules! json_record {
    ($ty:ty, $key:expr) => {
        impl $crate::store::Record for $ty {
            const KEY: &'static str = $key;

            fn encode(&self) -> Result<String, $crate::store::StoreError> {
                Ok(serde_json::to_string(self)?)
            }

            fn decode(raw: &str) -> Result<Self, $crate::store::StoreError> {
                serde_json::from_str(raw).map_err(|e| $crate::store::StoreError::Decode {
                    key: $key,
                    reason: e.to_string(),
                })
            }
        }
    };
}

/// What to do when a stored record cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Treat the record as absent and hand out its empty default
    #[default]
    DefaultOnError,
    /// Surface [`StoreError::Decode`] to the caller
    Strict,
}

/// Typed accessor over a shared store handle
#[derive(Clone)]
pub struct LocalStore {
    backend: Rc<dyn Store>,
    policy: DecodePolicy,
}

impl LocalStore {
    pub fn new(backend: impl Store + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
            policy: DecodePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read a record, or its empty default when absent or undecodable
    pub fn get<R: Record>(&self) -> Result<R, StoreError> {
        Ok(self.get_optional::<R>()?.unwrap_or_default())
    }

    /// Read a record, keeping absence visible
    pub fn get_optional<R: Record>(&self) -> Result<Option<R>, StoreError> {
        let Some(raw) = self.backend.get_raw(R::KEY)? else {
            return Ok(None);
        };

        match R::decode(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => match self.policy {
                DecodePolicy::DefaultOnError => {
                    tracing::warn!(key = R::KEY, error = %e, "discarding malformed record");
                    Ok(None)
                }
                DecodePolicy::Strict => Err(e),
            },
        }
    }

    /// Overwrite a record
    pub fn set<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let raw = record.encode()?;
        self.backend.set_raw(R::KEY, &raw)?;
        tracing::debug!(key = R::KEY, bytes = raw.len(), "record written");
        Ok(())
    }

    pub fn remove<R: Record>(&self) -> Result<(), StoreError> {
        self.backend.remove(R::KEY)?;
        tracing::debug!(key = R::KEY, "record removed");
        Ok(())
    }

    /// Remove several records in one step
    pub fn remove_keys(&self, keys: &[&'static str]) -> Result<(), StoreError> {
        self.backend.remove_many(keys)?;
        tracing::debug!(?keys, "records removed");
        Ok(())
    }

    pub fn poll_external(&self) -> Result<Vec<StorageChange>, StoreError> {
        self.backend.poll_external()
    }

    pub fn backend(&self) -> &dyn Store {
        self.backend.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    crate::json_record!(Counter, "counter");

    #[test]
    fn test_absent_record_yields_default() {
        let store = LocalStore::new(MemoryStore::new());
        assert_eq!(store.get::<Counter>().unwrap(), Counter::default());
        assert!(store.get_optional::<Counter>().unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let store = LocalStore::new(MemoryStore::new());
        store.set(&Counter { value: 7 }).unwrap();
        assert_eq!(store.get::<Counter>().unwrap().value, 7);
        assert_eq!(
            store.backend().get_raw("counter").unwrap().as_deref(),
            Some(r#"{"value":7}"#)
        );
    }

    #[test]
    fn test_malformed_record_falls_back_to_default() {
        let backend = MemoryStore::new();
        backend.set_raw("counter", "{oops").unwrap();
        let store = LocalStore::new(backend);

        assert_eq!(store.get::<Counter>().unwrap(), Counter::default());
        assert!(store.get_optional::<Counter>().unwrap().is_none());
    }

    #[test]
    fn test_strict_policy_surfaces_decode_error() {
        let backend = MemoryStore::new();
        backend.set_raw("counter", "[1,2]").unwrap();
        let store = LocalStore::new(backend).with_policy(DecodePolicy::Strict);

        let err = store.get::<Counter>().unwrap_err();
        assert!(matches!(err, StoreError::Decode { key: "counter", .. }));
    }

    #[test]
    fn test_remove_keys_drops_every_named_record() {
        let store = LocalStore::new(MemoryStore::new());
        store.backend().set_raw("a", "1").unwrap();
        store.backend().set_raw("b", "2").unwrap();
        store.backend().set_raw("c", "3").unwrap();

        store.remove_keys(&["a", "c"]).unwrap();
        assert_eq!(
            store.backend().entries().unwrap(),
            vec![("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_remove_record() {
        let store = LocalStore::new(MemoryStore::new());
        store.set(&Counter { value: 1 }).unwrap();
        store.remove::<Counter>().unwrap();
        assert!(store.backend().get_raw("counter").unwrap().is_none());
    }
}
