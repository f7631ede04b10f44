//! Save, load and clear a whole [`HistoryGraph`] under one versioned key.
//!
//! Two-layer API:
//! - **Fallible** `try_save` / `try_load` / `try_clear` return
//!   [`StorageError`] for callers that want to react to failures.
//! - **Best-effort** `save` / `load` / `clear` log failures with `tracing`
//!   and never return them. History persistence is a convenience; the
//!   in-memory engine stays fully usable when storage is broken.
//!
//! Loading validates the tree invariants, so a blob that parses but is
//! structurally inconsistent is reported as [`StorageError::Corrupt`]
//! (and as "nothing stored" by [`HistoryPersistence::load`]).

use serde::de::DeserializeOwned;
use serde::Serialize;

use timeline_core::HistoryGraph;

use crate::error::StorageError;
use crate::traits::KeyValueStore;
use crate::types::StorageKey;

/// Persistence adapter binding a store to a storage key.
#[derive(Debug)]
pub struct HistoryPersistence<S> {
    store: S,
    key: StorageKey,
}

impl<S: KeyValueStore> HistoryPersistence<S> {
    pub fn new(store: S, key: StorageKey) -> Self {
        HistoryPersistence { store, key }
    }

    /// Uses the default `timeline.history.v1` key.
    pub fn with_default_key(store: S) -> Self {
        HistoryPersistence::new(store, StorageKey::default())
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // -----------------------------------------------------------------------
    // Fallible layer
    // -----------------------------------------------------------------------

    /// Serializes `graph` and overwrites the stored entry.
    pub fn try_save<N: Serialize, E: Serialize>(
        &mut self,
        graph: &HistoryGraph<N, E>,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(graph)?;
        self.store.put(&self.key.to_string(), &json)?;
        tracing::debug!(
            "saved history under {} ({} nodes, {} bytes)",
            self.key,
            graph.node_count(),
            json.len()
        );
        Ok(())
    }

    /// Reads and validates the stored graph. `Ok(None)` when nothing is stored.
    pub fn try_load<N, E>(&self) -> Result<Option<HistoryGraph<N, E>>, StorageError>
    where
        N: DeserializeOwned,
        E: DeserializeOwned,
    {
        let raw = match self.store.get(&self.key.to_string())? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let graph: HistoryGraph<N, E> = serde_json::from_str(&raw)?;
        graph.validate().map_err(|e| StorageError::Corrupt {
            reason: e.to_string(),
        })?;
        tracing::debug!(
            "loaded history from {} ({} nodes)",
            self.key,
            graph.node_count()
        );
        Ok(Some(graph))
    }

    /// Removes the stored entry.
    pub fn try_clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(&self.key.to_string())?;
        tracing::debug!("cleared history under {}", self.key);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Best-effort layer
    // -----------------------------------------------------------------------

    /// [`try_save`](Self::try_save), logging instead of failing.
    pub fn save<N: Serialize, E: Serialize>(&mut self, graph: &HistoryGraph<N, E>) {
        if let Err(e) = self.try_save(graph) {
            tracing::warn!("failed to save history under {}: {}", self.key, e);
        }
    }

    /// [`try_load`](Self::try_load), treating every failure as "nothing stored".
    pub fn load<N, E>(&self) -> Option<HistoryGraph<N, E>>
    where
        N: DeserializeOwned,
        E: DeserializeOwned,
    {
        match self.try_load() {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!("discarding stored history under {}: {}", self.key, e);
                None
            }
        }
    }

    /// [`try_clear`](Self::try_clear), logging instead of failing.
    pub fn clear(&mut self) {
        if let Err(e) = self.try_clear() {
            tracing::warn!("failed to clear history under {}: {}", self.key, e);
        }
    }
}
