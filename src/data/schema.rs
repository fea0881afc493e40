use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Editor placement of a node. Carried through round-trips untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// One authored blackboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackboardVariable {
    pub key: String,
    pub value: i32,
}

impl BlackboardVariable {
    pub fn new(key: impl Into<String>, value: i32) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Serialized form of one node.
///
/// The reserved keys `_id`, `_position` and `_type` describe the node
/// itself; every other key is a variable value and lands in `fields` in
/// authored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(rename = "_id", default)]
    pub id: i32,
    #[serde(rename = "_position", default)]
    pub position: Position,
    #[serde(rename = "_type")]
    pub type_name: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, serde_json::Value>,
}

/// Serialized form of one connection, by node id and port name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub source: i32,
    pub source_port: String,
    pub target: i32,
    pub target_port: String,
}

/// Top-level graph document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub blackboard: Vec<BlackboardVariable>,
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}
