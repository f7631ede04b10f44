//! HistoryGraph: the id-indexed arena holding every recorded transition.
//!
//! Nodes live in a single map keyed by [`HistoryNodeId`] and link to each
//! other by id (`parent_id`, `children_ids`) instead of owning each other.
//! That keeps subtree deletion a set removal and lets the whole tree
//! serialize as one flat map.
//!
//! # Invariants
//!
//! - The root node exists, has no parent, and keeps its id for the
//!   lifetime of the graph.
//! - The cursor always names an existing node.
//! - Every non-root node's parent exists and lists the node exactly once
//!   in `children_ids`; following parents always reaches the root.
//! - `children_ids` only ever grows by appending, so sibling order is
//!   creation order.
//!
//! All mutations go through `HistoryGraph` methods. A deserialized graph
//! bypasses them, so callers loading stored graphs run [`HistoryGraph::validate`].

use std::collections::HashSet;
use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::HistoryError;
use crate::id::HistoryNodeId;
use crate::metadata::NodeMetadata;
use crate::snapshot::StateSnapshot;

/// Label given to the root node of a fresh graph.
pub const ROOT_LABEL: &str = "Initial state";

/// One recorded transition plus its tree linkage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryNode<N, E> {
    pub id: HistoryNodeId,
    /// `None` only for the root.
    pub parent_id: Option<HistoryNodeId>,
    /// Children in creation order (oldest branch first).
    pub children_ids: SmallVec<[HistoryNodeId; 2]>,
    /// Short description such as "add node" or "delete edge".
    pub label: String,
    pub before: StateSnapshot<N, E>,
    pub after: StateSnapshot<N, E>,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "NodeMetadata::is_empty")]
    pub metadata: NodeMetadata,
}

impl<N, E> HistoryNode<N, E> {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children_ids.is_empty()
    }

    /// More than one child: the user undid here and then took a new action.
    pub fn is_branch_point(&self) -> bool {
        self.children_ids.len() > 1
    }
}

/// Result of [`HistoryGraph::delete_subtree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSubtree {
    /// The deleted node followed by all of its descendants, pre-order.
    pub removed: Vec<HistoryNodeId>,
    /// New cursor when the old one was inside the deleted subtree.
    pub relocated_cursor: Option<HistoryNodeId>,
}

/// Tree of every transition recorded in an editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryGraph<N, E> {
    nodes: IndexMap<HistoryNodeId, HistoryNode<N, E>>,
    root: HistoryNodeId,
    cursor: HistoryNodeId,
    /// Sequence counter behind generated ids.
    #[serde(default)]
    next_seq: u64,
}

impl<N: Clone, E: Clone> HistoryGraph<N, E> {
    /// Creates a graph holding only the root, positioned at the root.
    ///
    /// The root's `before` and `after` are both copies of `initial`.
    pub fn new(initial: StateSnapshot<N, E>) -> Self {
        let root = HistoryNodeId::root();
        let node = HistoryNode {
            id: root.clone(),
            parent_id: None,
            children_ids: SmallVec::new(),
            label: ROOT_LABEL.to_string(),
            before: initial.clone(),
            after: initial,
            created_at: now_millis(),
            metadata: NodeMetadata::default(),
        };

        let mut nodes = IndexMap::new();
        nodes.insert(root.clone(), node);

        HistoryGraph {
            nodes,
            cursor: root.clone(),
            root,
            next_seq: 0,
        }
    }

    /// Discards all history and starts over from `initial`.
    pub fn reset(&mut self, initial: StateSnapshot<N, E>) {
        *self = HistoryGraph::new(initial);
    }
}

impl<N, E> HistoryGraph<N, E> {
    pub fn root(&self) -> &HistoryNodeId {
        &self.root
    }

    pub fn cursor(&self) -> &HistoryNodeId {
        &self.cursor
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: &HistoryNodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &HistoryNodeId) -> Option<&HistoryNode<N, E>> {
        self.nodes.get(id)
    }

    /// Like [`get`](Self::get), but a missing id is a [`HistoryError::NodeNotFound`].
    pub fn node(&self, id: &HistoryNodeId) -> Result<&HistoryNode<N, E>, HistoryError> {
        self.nodes.get(id).ok_or_else(|| HistoryError::not_found(id))
    }

    /// All nodes in insertion order. Use ids, not positions, for traversal.
    pub fn nodes(&self) -> impl Iterator<Item = &HistoryNode<N, E>> {
        self.nodes.values()
    }

    /// Records a transition as a new child of `parent`.
    ///
    /// The cursor does not move; pair with [`redo`](Self::redo) (or let a
    /// session do it) to make the new node current.
    pub fn append_child(
        &mut self,
        parent: &HistoryNodeId,
        label: impl Into<String>,
        before: StateSnapshot<N, E>,
        after: StateSnapshot<N, E>,
        metadata: NodeMetadata,
    ) -> Result<HistoryNodeId, HistoryError> {
        self.append_child_at(parent, label, before, after, metadata, now_millis())
    }

    /// [`append_child`](Self::append_child) with an explicit creation time.
    pub fn append_child_at(
        &mut self,
        parent: &HistoryNodeId,
        label: impl Into<String>,
        before: StateSnapshot<N, E>,
        after: StateSnapshot<N, E>,
        metadata: NodeMetadata,
        created_at: u64,
    ) -> Result<HistoryNodeId, HistoryError> {
        if !self.nodes.contains_key(parent) {
            return Err(HistoryError::not_found(parent));
        }

        let id = self.next_id(created_at);
        let node = HistoryNode {
            id: id.clone(),
            parent_id: Some(parent.clone()),
            children_ids: SmallVec::new(),
            label: label.into(),
            before,
            after,
            created_at,
            metadata,
        };

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children_ids.push(id.clone());
        }
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Removes `id` and every descendant.
    ///
    /// The root cannot be deleted (use [`reset`](Self::reset)). If the cursor
    /// was inside the subtree it moves to the nearest surviving ancestor,
    /// which is always the deleted node's parent.
    pub fn delete_subtree(&mut self, id: &HistoryNodeId) -> Result<DeletedSubtree, HistoryError> {
        let target = self.node(id)?;
        let parent = match &target.parent_id {
            Some(parent) => parent.clone(),
            None => {
                return Err(HistoryError::InvalidOperation {
                    reason: "the root node cannot be deleted".to_string(),
                })
            }
        };

        let mut removed = vec![id.clone()];
        removed.extend(self.descendants(id)?);
        let doomed: HashSet<&HistoryNodeId> = removed.iter().collect();

        let relocated_cursor = if doomed.contains(&self.cursor) {
            let mut candidate = self.cursor.clone();
            while doomed.contains(&candidate) {
                candidate = match self.nodes.get(&candidate).and_then(|n| n.parent_id.clone()) {
                    Some(up) => up,
                    None => self.root.clone(),
                };
            }
            Some(candidate)
        } else {
            None
        };

        self.nodes.retain(|key, _| !doomed.contains(key));
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children_ids.retain(|child| child != id);
        }
        if let Some(cursor) = &relocated_cursor {
            self.cursor = cursor.clone();
        }

        Ok(DeletedSubtree {
            removed,
            relocated_cursor,
        })
    }

    /// Checks every structural invariant listed in the module docs.
    pub fn validate(&self) -> Result<(), HistoryError> {
        let root = self
            .nodes
            .get(&self.root)
            .ok_or_else(|| HistoryError::inconsistent(format!("root {} is missing", self.root)))?;
        if root.parent_id.is_some() {
            return Err(HistoryError::inconsistent("root has a parent"));
        }
        if !self.nodes.contains_key(&self.cursor) {
            return Err(HistoryError::inconsistent(format!(
                "cursor {} does not name a node",
                self.cursor
            )));
        }

        for (key, node) in &self.nodes {
            if key != &node.id {
                return Err(HistoryError::inconsistent(format!(
                    "node stored under {} carries id {}",
                    key, node.id
                )));
            }

            match &node.parent_id {
                None if key != &self.root => {
                    return Err(HistoryError::inconsistent(format!(
                        "non-root node {} has no parent",
                        key
                    )));
                }
                None => {}
                Some(parent_id) => {
                    let parent = self.nodes.get(parent_id).ok_or_else(|| {
                        HistoryError::inconsistent(format!(
                            "node {} references missing parent {}",
                            key, parent_id
                        ))
                    })?;
                    let listed = parent.children_ids.iter().filter(|c| *c == key).count();
                    if listed != 1 {
                        return Err(HistoryError::inconsistent(format!(
                            "parent {} lists child {} {} times",
                            parent_id, key, listed
                        )));
                    }
                }
            }

            for child in &node.children_ids {
                let child_node = self.nodes.get(child).ok_or_else(|| {
                    HistoryError::inconsistent(format!(
                        "node {} lists missing child {}",
                        key, child
                    ))
                })?;
                if child_node.parent_id.as_ref() != Some(key) {
                    return Err(HistoryError::inconsistent(format!(
                        "child {} of {} points at a different parent",
                        child, key
                    )));
                }
            }
        }

        // Bidirectional links hold; a parent chain that never reaches the
        // root is now only possible through a cycle.
        for key in self.nodes.keys() {
            let mut current = key;
            let mut steps = 0;
            while let Some(parent) = self.nodes.get(current).and_then(|n| n.parent_id.as_ref()) {
                steps += 1;
                if steps > self.nodes.len() {
                    return Err(HistoryError::inconsistent(format!(
                        "parent chain of {} contains a cycle",
                        key
                    )));
                }
                current = parent;
            }
            if current != &self.root {
                return Err(HistoryError::inconsistent(format!(
                    "node {} does not descend from the root",
                    key
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn set_cursor(&mut self, id: HistoryNodeId) {
        debug_assert!(self.nodes.contains_key(&id));
        self.cursor = id;
    }

    fn next_id(&mut self, created_at: u64) -> HistoryNodeId {
        loop {
            self.next_seq += 1;
            let id = HistoryNodeId::generated(created_at, self.next_seq);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
