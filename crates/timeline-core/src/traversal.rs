//! Cursor movement, jump-to-state and derived queries.
//!
//! Undo and redo are pure cursor moves along parent/child links. Jumping
//! between two arbitrary nodes goes through their lowest common ancestor:
//! undo up to it, then redo down the target's path, choosing the branch at
//! each step from that path.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::HistoryError;
use crate::graph::{HistoryGraph, HistoryNode};
use crate::id::HistoryNodeId;
use crate::snapshot::StateSnapshot;

/// The moves separating two history nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditPath {
    /// Deepest node shared by both root paths.
    pub common_ancestor: HistoryNodeId,
    /// Nodes undone, in order, starting from the origin.
    pub undo: Vec<HistoryNodeId>,
    /// Nodes entered, in order, ending at the target.
    pub redo: Vec<HistoryNodeId>,
}

impl EditPath {
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Total number of single-step moves.
    pub fn len(&self) -> usize {
        self.undo.len() + self.redo.len()
    }
}

/// Aggregate counts for history panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total_nodes: usize,
    /// Nodes with more than one child.
    pub branches: usize,
    /// Nodes with no children.
    pub leaf_nodes: usize,
    /// Length of the root-to-cursor path minus one.
    pub max_depth: usize,
}

impl<N, E> HistoryGraph<N, E> {
    /// The node the cursor points at.
    pub fn current(&self) -> &HistoryNode<N, E> {
        // The cursor names an existing node on every path that sets it.
        match self.get(self.cursor()) {
            Some(node) => node,
            None => unreachable!("cursor {} does not name a node", self.cursor()),
        }
    }

    /// The state the editor should display at the cursor.
    pub fn current_state(&self) -> &StateSnapshot<N, E> {
        &self.current().after
    }

    pub fn can_undo(&self) -> bool {
        self.current().parent_id.is_some()
    }

    pub fn can_redo(&self) -> bool {
        !self.current().children_ids.is_empty()
    }

    /// Children of the cursor node; a choice is needed when there are several.
    pub fn branch_options(&self) -> &[HistoryNodeId] {
        &self.current().children_ids
    }

    /// Moves the cursor to its parent. Returns the new cursor, or `None` at the root.
    pub fn undo(&mut self) -> Option<HistoryNodeId> {
        let parent = self.current().parent_id.clone()?;
        self.set_cursor(parent.clone());
        Some(parent)
    }

    /// Moves the cursor to one of its children.
    ///
    /// With no children this is a no-op returning `Ok(None)`. A single child
    /// is taken without a `branch`. At a branch point `branch` is required;
    /// without it the call fails with [`HistoryError::BranchChoiceRequired`]
    /// listing the options.
    pub fn redo(
        &mut self,
        branch: Option<&HistoryNodeId>,
    ) -> Result<Option<HistoryNodeId>, HistoryError> {
        let children = &self.current().children_ids;
        let next = match (branch, children.len()) {
            (_, 0) => return Ok(None),
            (Some(choice), _) => {
                if !children.contains(choice) {
                    return Err(HistoryError::InvalidOperation {
                        reason: format!(
                            "{} is not a child of the current node {}",
                            choice,
                            self.cursor()
                        ),
                    });
                }
                choice.clone()
            }
            (None, 1) => children[0].clone(),
            (None, _) => {
                return Err(HistoryError::BranchChoiceRequired {
                    options: children.to_vec(),
                })
            }
        };
        self.set_cursor(next.clone());
        Ok(Some(next))
    }

    /// Moves the cursor to `target` through the common ancestor.
    ///
    /// Returns the moves taken. Jumping to the cursor is a no-op with an
    /// empty path.
    pub fn jump_to(&mut self, target: &HistoryNodeId) -> Result<EditPath, HistoryError> {
        let path = self.plan_path(self.cursor(), target)?;
        for _ in &path.undo {
            self.undo();
        }
        for step in &path.redo {
            self.redo(Some(step))?;
        }
        debug_assert_eq!(self.cursor(), target);
        Ok(path)
    }

    /// Computes the moves from `from` to `to` without touching the cursor.
    pub fn plan_path(
        &self,
        from: &HistoryNodeId,
        to: &HistoryNodeId,
    ) -> Result<EditPath, HistoryError> {
        let from_path = self.path_from_root(from)?;
        let to_path = self.path_from_root(to)?;
        let common = common_prefix_len(&from_path, &to_path);
        if common == 0 {
            return Err(HistoryError::inconsistent(format!(
                "{} and {} share no root",
                from, to
            )));
        }

        Ok(EditPath {
            common_ancestor: from_path[common - 1].clone(),
            undo: from_path[common..].iter().rev().cloned().collect(),
            redo: to_path[common..].to_vec(),
        })
    }

    /// Ids from the root down to `id`, both included.
    pub fn path_from_root(&self, id: &HistoryNodeId) -> Result<Vec<HistoryNodeId>, HistoryError> {
        self.node(id)?;
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(step) = current {
            if path.len() > self.node_count() {
                return Err(HistoryError::inconsistent(format!(
                    "parent chain of {} contains a cycle",
                    id
                )));
            }
            path.push(step.clone());
            current = self.get(step).and_then(|n| n.parent_id.as_ref());
        }
        path.reverse();
        Ok(path)
    }

    /// Root-to-cursor chain of nodes, for breadcrumbs and linear timelines.
    pub fn path_to_cursor(&self) -> Vec<&HistoryNode<N, E>> {
        self.path_from_root(self.cursor())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Ids on the root-to-cursor path: the committed past.
    pub fn reachable_from_root(&self) -> HashSet<HistoryNodeId> {
        self.path_from_root(self.cursor())
            .unwrap_or_default()
            .into_iter()
            .collect()
    }

    /// Number of edges between the root and `id`.
    pub fn depth_of(&self, id: &HistoryNodeId) -> Result<usize, HistoryError> {
        Ok(self.path_from_root(id)?.len() - 1)
    }

    /// Every descendant of `id`, pre-order, siblings in creation order.
    pub fn descendants(&self, id: &HistoryNodeId) -> Result<Vec<HistoryNodeId>, HistoryError> {
        let start = self.node(id)?;
        let mut out = Vec::new();
        let mut stack: Vec<&HistoryNodeId> = start.children_ids.iter().rev().collect();
        while let Some(next) = stack.pop() {
            if out.len() > self.node_count() {
                return Err(HistoryError::inconsistent(format!(
                    "subtree of {} contains a cycle",
                    id
                )));
            }
            out.push(next.clone());
            if let Some(node) = self.get(next) {
                stack.extend(node.children_ids.iter().rev());
            }
        }
        Ok(out)
    }

    pub fn lowest_common_ancestor(
        &self,
        a: &HistoryNodeId,
        b: &HistoryNodeId,
    ) -> Result<HistoryNodeId, HistoryError> {
        Ok(self.plan_path(a, b)?.common_ancestor)
    }

    /// Whether `ancestor` lies on the root path of `node` (a node is its own ancestor).
    pub fn is_ancestor(
        &self,
        ancestor: &HistoryNodeId,
        node: &HistoryNodeId,
    ) -> Result<bool, HistoryError> {
        self.node(ancestor)?;
        Ok(self.path_from_root(node)?.contains(ancestor))
    }

    /// Tips of every branch.
    pub fn leaves(&self) -> Vec<&HistoryNodeId> {
        self.nodes()
            .filter(|node| node.is_leaf())
            .map(|node| &node.id)
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        let mut branches = 0;
        let mut leaf_nodes = 0;
        for node in self.nodes() {
            if node.is_branch_point() {
                branches += 1;
            }
            if node.is_leaf() {
                leaf_nodes += 1;
            }
        }

        HistoryStats {
            total_nodes: self.node_count(),
            branches,
            leaf_nodes,
            max_depth: self.path_to_cursor().len().saturating_sub(1),
        }
    }
}

fn common_prefix_len(a: &[HistoryNodeId], b: &[HistoryNodeId]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
