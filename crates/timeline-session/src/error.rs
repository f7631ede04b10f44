//! Session error types.
//!
//! [`SessionError`] unifies engine and storage failures for editor code.
//! Storage errors only surface from explicit operations (opening a backend,
//! [`HistorySession::flush`](crate::HistorySession::flush)); routine
//! persistence after each change is best-effort and never fails a call.

use timeline_core::HistoryError;
use timeline_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The history engine rejected the operation.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Whether the error is an unknown history node id.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::History(HistoryError::NodeNotFound { .. }))
    }

    /// Branch options when redo needs the caller to pick a branch.
    pub fn branch_options(&self) -> Option<&[timeline_core::HistoryNodeId]> {
        match self {
            SessionError::History(HistoryError::BranchChoiceRequired { options }) => {
                Some(options)
            }
            _ => None,
        }
    }
}
