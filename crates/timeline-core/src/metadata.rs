//! Free-form metadata attached to history nodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an editing action, used to group and color history entries.
///
/// Serialized as its snake_case tag; unknown tags round-trip through
/// [`ActionType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    NodeAdd,
    NodeDelete,
    NodeUpdate,
    NodeMove,
    EdgeAdd,
    EdgeDelete,
    BulkUpdate,
    Paste,
    Duplicate,
    Other(String),
}

impl ActionType {
    pub fn as_str(&self) -> &str {
        match self {
            ActionType::NodeAdd => "node_add",
            ActionType::NodeDelete => "node_delete",
            ActionType::NodeUpdate => "node_update",
            ActionType::NodeMove => "node_move",
            ActionType::EdgeAdd => "edge_add",
            ActionType::EdgeDelete => "edge_delete",
            ActionType::BulkUpdate => "bulk_update",
            ActionType::Paste => "paste",
            ActionType::Duplicate => "duplicate",
            ActionType::Other(tag) => tag,
        }
    }
}

impl From<String> for ActionType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "node_add" => ActionType::NodeAdd,
            "node_delete" => ActionType::NodeDelete,
            "node_update" => ActionType::NodeUpdate,
            "node_move" => ActionType::NodeMove,
            "edge_add" => ActionType::EdgeAdd,
            "edge_delete" => ActionType::EdgeDelete,
            "bulk_update" => ActionType::BulkUpdate,
            "paste" => ActionType::Paste,
            "duplicate" => ActionType::Duplicate,
            _ => ActionType::Other(tag),
        }
    }
}

impl From<&str> for ActionType {
    fn from(tag: &str) -> Self {
        ActionType::from(tag.to_string())
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        match action {
            ActionType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value metadata of a history node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<ActionType>,
    /// Application-defined entries.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NodeMetadata {
    pub fn new() -> Self {
        NodeMetadata::default()
    }

    pub fn action(action_type: impl Into<ActionType>) -> Self {
        NodeMetadata {
            action_type: Some(action_type.into()),
            extra: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.action_type.is_none() && self.extra.is_empty()
    }
}
