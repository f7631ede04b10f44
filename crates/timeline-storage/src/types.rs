//! Storage-layer types.
//!
//! [`StorageKey`] carries the schema version so that a graph written by one
//! release is never parsed by an incompatible one: bumping the version moves
//! reads and writes to a fresh key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Versioned key a history graph is stored under, rendered as `"{namespace}.v{version}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey {
    pub namespace: String,
    pub version: u32,
}

impl StorageKey {
    pub const DEFAULT_NAMESPACE: &'static str = "timeline.history";
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(namespace: impl Into<String>, version: u32) -> Self {
        StorageKey {
            namespace: namespace.into(),
            version,
        }
    }

    /// The default namespace at a given schema version.
    pub fn versioned(version: u32) -> Self {
        StorageKey::new(Self::DEFAULT_NAMESPACE, version)
    }
}

impl Default for StorageKey {
    fn default() -> Self {
        StorageKey::versioned(Self::CURRENT_VERSION)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.v{}", self.namespace, self.version)
    }
}
