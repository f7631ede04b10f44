//! In-memory implementation of [`KeyValueStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests, ephemeral editor
//! sessions, and anywhere persistence isn't wanted. Semantics match the
//! durable backends exactly.

use std::collections::HashMap;

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// HashMap-backed key-value store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
