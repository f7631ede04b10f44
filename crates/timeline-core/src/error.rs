//! Error types for timeline-core.
//!
//! Every fallible graph operation checks its preconditions before writing,
//! so an `Err` always means the graph was left exactly as it was.

use thiserror::Error;

use crate::id::HistoryNodeId;

/// Errors produced by history graph operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// An operation referenced an id that is not in the graph.
    #[error("history node not found: {id}")]
    NodeNotFound { id: HistoryNodeId },

    /// The operation is not permitted in the current graph state.
    #[error("invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Redo was requested at a branch point without naming a branch.
    #[error("redo requires a branch choice among {} children", options.len())]
    BranchChoiceRequired { options: Vec<HistoryNodeId> },

    /// A structural invariant of the tree does not hold.
    #[error("history graph inconsistency: {reason}")]
    Inconsistent { reason: String },

    /// Snapshot content could not be serialized for hashing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HistoryError {
    pub(crate) fn not_found(id: &HistoryNodeId) -> Self {
        HistoryError::NodeNotFound { id: id.clone() }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        HistoryError::Inconsistent {
            reason: reason.into(),
        }
    }
}
