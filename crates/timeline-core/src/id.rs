//! Identifiers for history nodes.
//!
//! Ids are plain strings so they survive serialization unchanged and can be
//! handed straight to presentation code. The root always uses
//! [`HistoryNodeId::ROOT`]; every other id is `"{created_at_ms}-{seq}"`.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a node in a [`HistoryGraph`](crate::HistoryGraph).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryNodeId(String);

impl HistoryNodeId {
    /// The fixed id of every graph's root node.
    pub const ROOT: &'static str = "root";

    /// Wraps an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        HistoryNodeId(id.into())
    }

    /// The root node id.
    pub fn root() -> Self {
        HistoryNodeId(Self::ROOT.to_string())
    }

    /// Builds a generated id from a creation timestamp and a sequence number.
    ///
    /// The sequence disambiguates nodes created within the same millisecond.
    pub fn generated(created_at_ms: u64, seq: u64) -> Self {
        HistoryNodeId(format!("{}-{}", created_at_ms, seq))
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for HistoryNodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HistoryNodeId {
    fn from(s: &str) -> Self {
        HistoryNodeId(s.to_string())
    }
}

impl From<String> for HistoryNodeId {
    fn from(s: String) -> Self {
        HistoryNodeId(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_id_is_fixed() {
        assert_eq!(HistoryNodeId::root().as_str(), "root");
        assert!(HistoryNodeId::root().is_root());
        assert!(!HistoryNodeId::new("1700000000000-1").is_root());
    }

    #[test]
    fn generated_ids_differ_by_sequence() {
        let a = HistoryNodeId::generated(1_700_000_000_000, 1);
        let b = HistoryNodeId::generated(1_700_000_000_000, 2);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "1700000000000-1");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = HistoryNodeId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        let back: HistoryNodeId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, id);
    }
}
