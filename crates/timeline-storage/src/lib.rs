//! Durable storage for timeline history graphs.
//!
//! Provides the [`KeyValueStore`] trait that every backend implements, three
//! backends ([`InMemoryStore`], [`SqliteStore`], [`FileStore`]), and the
//! [`HistoryPersistence`] adapter that saves and loads a whole
//! `HistoryGraph` under one versioned key.
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`types`]: StorageKey, the versioned key a graph is stored under
//! - [`traits`]: KeyValueStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL schema migrations for the SQLite backend
//! - [`sqlite`]: SqliteStore implementation
//! - [`file`]: FileStore implementation
//! - [`persist`]: HistoryPersistence save/load/clear adapter

pub mod error;
pub mod file;
pub mod memory;
pub mod persist;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use persist::HistoryPersistence;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;
pub use types::StorageKey;
