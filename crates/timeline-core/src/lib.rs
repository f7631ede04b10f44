//! In-memory branching history engine for node-graph editors.
//!
//! A [`HistoryGraph`] records every editing transition as a [`HistoryNode`]
//! holding the `before`/`after` [`StateSnapshot`] pair. Undoing and then
//! editing never discards the abandoned future: it stays in the tree as a
//! sibling branch, and the cursor can be moved to any node.
//!
//! # Modules
//!
//! - [`id`]: `HistoryNodeId` and the id generator
//! - [`snapshot`]: `StateSnapshot`, `Viewport`, equality policy and structural hashing
//! - [`metadata`]: `NodeMetadata` and `ActionType` tags
//! - [`graph`]: `HistoryGraph` arena, construction, append and deletion
//! - [`traversal`]: cursor moves, jump-to-state, derived queries and statistics
//! - [`error`]: `HistoryError`

pub mod error;
pub mod graph;
pub mod id;
pub mod metadata;
pub mod snapshot;
pub mod traversal;

pub use error::HistoryError;
pub use graph::{DeletedSubtree, HistoryGraph, HistoryNode};
pub use id::HistoryNodeId;
pub use metadata::{ActionType, NodeMetadata};
pub use snapshot::{StateSnapshot, Viewport, ViewportPolicy};
pub use traversal::{EditPath, HistoryStats};
