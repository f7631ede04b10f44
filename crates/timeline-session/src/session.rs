//! HistorySession: the owner of a session's history graph.
//!
//! Editors call [`HistorySession::record`] (or [`commit`](HistorySession::commit))
//! whenever an action completes, and the undo/redo/jump methods when the user
//! navigates. Navigation methods return the snapshot the editor should
//! display next: always the `after` state of the new cursor node.
//!
//! After every change the graph is saved through the best-effort layer of
//! [`HistoryPersistence`], so storage trouble is logged and never turns a
//! successful edit into an error.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use timeline_core::{
    DeletedSubtree, EditPath, HistoryGraph, HistoryNode, HistoryNodeId, HistoryStats,
    NodeMetadata, StateSnapshot, ViewportPolicy,
};
use timeline_storage::{HistoryPersistence, KeyValueStore, StorageError};

use crate::config::SessionConfig;
use crate::error::SessionError;

/// Branching undo/redo history bound to a persistence backend.
pub struct HistorySession<N, E, S = Box<dyn KeyValueStore>> {
    graph: HistoryGraph<N, E>,
    persistence: HistoryPersistence<S>,
    viewport_policy: ViewportPolicy,
    persist_on_change: bool,
}

impl<N, E> HistorySession<N, E>
where
    N: Clone + PartialEq + Serialize + DeserializeOwned,
    E: Clone + PartialEq + Serialize + DeserializeOwned,
{
    /// Opens the configured backend and restores its history, or starts a
    /// fresh graph at `initial` when nothing usable is stored.
    pub fn open(config: &SessionConfig, initial: StateSnapshot<N, E>) -> Result<Self, SessionError> {
        let store = config.backend.open()?;
        Ok(HistorySession::with_store(store, config, initial))
    }
}

impl<N, E, S> HistorySession<N, E, S>
where
    N: Clone + PartialEq + Serialize + DeserializeOwned,
    E: Clone + PartialEq + Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Builds a session over an already opened store.
    pub fn with_store(store: S, config: &SessionConfig, initial: StateSnapshot<N, E>) -> Self {
        let persistence = HistoryPersistence::new(store, config.storage_key.clone());
        let restored = if config.persist_on_change {
            persistence.load()
        } else {
            None
        };

        let graph = match restored {
            Some(graph) => {
                tracing::info!(
                    "restored history from {} ({} nodes, cursor {})",
                    persistence.key(),
                    graph.node_count(),
                    graph.cursor()
                );
                graph
            }
            None => {
                tracing::info!("starting new history under {}", persistence.key());
                HistoryGraph::new(initial)
            }
        };

        HistorySession {
            graph,
            persistence,
            viewport_policy: config.viewport_policy,
            persist_on_change: config.persist_on_change,
        }
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Records a completed action as a child of the cursor and moves there.
    ///
    /// Returns `Ok(None)` without touching history when `before` and
    /// `after` are the same state under the session's viewport policy.
    pub fn record(
        &mut self,
        label: impl Into<String>,
        before: StateSnapshot<N, E>,
        after: StateSnapshot<N, E>,
        metadata: NodeMetadata,
    ) -> Result<Option<HistoryNodeId>, SessionError> {
        let label = label.into();
        if before.same_state_with(&after, self.viewport_policy) {
            tracing::debug!("skipping no-op edit '{}'", label);
            return Ok(None);
        }

        let parent = self.graph.cursor().clone();
        let id = self
            .graph
            .append_child(&parent, label.as_str(), before, after, metadata)?;
        self.graph.redo(Some(&id))?;
        tracing::debug!("recorded '{}' as {} under {}", label, id, parent);

        self.persist();
        Ok(Some(id))
    }

    /// [`record`](Self::record) with `before` taken from the current state.
    pub fn commit(
        &mut self,
        label: impl Into<String>,
        after: StateSnapshot<N, E>,
        metadata: NodeMetadata,
    ) -> Result<Option<HistoryNodeId>, SessionError> {
        let before = self.graph.current_state().clone();
        self.record(label, before, after, metadata)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Steps back to the parent. `None` at the root.
    pub fn undo(&mut self) -> Option<&StateSnapshot<N, E>> {
        let moved = self.graph.undo()?;
        tracing::debug!("undo to {}", moved);
        self.persist();
        Some(self.graph.current_state())
    }

    /// Steps forward to a child; see [`HistoryGraph::redo`] for branch rules.
    pub fn redo(
        &mut self,
        branch: Option<&HistoryNodeId>,
    ) -> Result<Option<&StateSnapshot<N, E>>, SessionError> {
        match self.graph.redo(branch)? {
            Some(moved) => {
                tracing::debug!("redo to {}", moved);
                self.persist();
                Ok(Some(self.graph.current_state()))
            }
            None => Ok(None),
        }
    }

    /// Moves to any node and returns its state.
    pub fn jump_to(&mut self, target: &HistoryNodeId) -> Result<&StateSnapshot<N, E>, SessionError> {
        let path = self.graph.jump_to(target)?;
        if !path.is_empty() {
            tracing::debug!(
                "jumped to {} ({} undo, {} redo via {})",
                target,
                path.undo.len(),
                path.redo.len(),
                path.common_ancestor
            );
            self.persist();
        }
        Ok(self.graph.current_state())
    }

    /// The moves a jump from the cursor to `target` would take.
    pub fn plan_jump(&self, target: &HistoryNodeId) -> Result<EditPath, SessionError> {
        Ok(self.graph.plan_path(self.graph.cursor(), target)?)
    }

    // -----------------------------------------------------------------------
    // Pruning
    // -----------------------------------------------------------------------

    /// Deletes a node and its descendants; the cursor moves up if it was inside.
    pub fn delete_subtree(&mut self, id: &HistoryNodeId) -> Result<DeletedSubtree, SessionError> {
        let deleted = self.graph.delete_subtree(id)?;
        tracing::debug!(
            "deleted {} history node(s) under {}",
            deleted.removed.len(),
            id
        );
        if let Some(cursor) = &deleted.relocated_cursor {
            tracing::debug!("cursor relocated to {}", cursor);
        }
        self.persist();
        Ok(deleted)
    }

    /// Clears all history, stored copy included, and starts over at `initial`.
    pub fn reset(&mut self, initial: StateSnapshot<N, E>) {
        self.graph.reset(initial);
        tracing::info!("history reset under {}", self.persistence.key());
        if self.persist_on_change {
            self.persistence.clear();
            self.persistence.save(&self.graph);
        }
    }

    /// Saves now regardless of `persist_on_change`, reporting failures.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.persistence.try_save(&self.graph)
    }

    fn persist(&mut self) {
        if self.persist_on_change {
            self.persistence.save(&self.graph);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &HistoryGraph<N, E> {
        &self.graph
    }

    pub fn get(&self, id: &HistoryNodeId) -> Option<&HistoryNode<N, E>> {
        self.graph.get(id)
    }

    pub fn cursor(&self) -> &HistoryNodeId {
        self.graph.cursor()
    }

    pub fn current_state(&self) -> &StateSnapshot<N, E> {
        self.graph.current_state()
    }

    pub fn can_undo(&self) -> bool {
        self.graph.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.graph.can_redo()
    }

    pub fn branch_options(&self) -> &[HistoryNodeId] {
        self.graph.branch_options()
    }

    pub fn path_to_cursor(&self) -> Vec<&HistoryNode<N, E>> {
        self.graph.path_to_cursor()
    }

    pub fn reachable_from_root(&self) -> HashSet<HistoryNodeId> {
        self.graph.reachable_from_root()
    }

    pub fn stats(&self) -> HistoryStats {
        self.graph.stats()
    }

    pub fn viewport_policy(&self) -> ViewportPolicy {
        self.viewport_policy
    }

    pub fn persistence(&self) -> &HistoryPersistence<S> {
        &self.persistence
    }

    /// Ends the session, handing back the store.
    pub fn into_store(self) -> S {
        self.persistence.into_inner()
    }
}
