//! The [`KeyValueStore`] trait defining the storage contract.
//!
//! The history engine persists one serialized blob per key, so the contract
//! is a plain string key-value map. All backends (InMemoryStore,
//! SqliteStore, FileStore) implement it and are swappable without touching
//! the persistence adapter.

use crate::error::StorageError;

/// A durable string key-value map.
///
/// The trait is synchronous to match the engine's single-threaded design.
pub trait KeyValueStore {
    /// Reads the value under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn contains(&self, key: &str) -> Result<bool, StorageError> {
        (**self).contains(key)
    }
}
