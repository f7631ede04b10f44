//! Editor-facing controller for the branching history engine.
//!
//! [`HistorySession`] is the single owner of a session's
//! [`HistoryGraph`](timeline_core::HistoryGraph). Editors report every
//! completed action to it; it skips no-op edits, records the rest under the
//! cursor, and writes the graph to the configured backend after each
//! change.
//!
//! # Modules
//!
//! - [`config`]: SessionConfig and backend selection, with environment loading
//! - [`session`]: HistorySession record/undo/redo/jump/delete/reset
//! - [`error`]: SessionError

pub mod config;
pub mod error;
pub mod session;

pub use config::{Backend, SessionConfig};
pub use error::SessionError;
pub use session::HistorySession;
