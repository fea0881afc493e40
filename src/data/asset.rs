use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

use crate::data::schema::BlackboardVariable;
use crate::error::DataError;

/// Portable ability pack: a name, the shared variable template and one
/// JSON graph document per flow.
///
/// Graphs stay as JSON text inside the pack, so a pack can be shipped
/// and loaded against a registry that did not exist when it was saved;
/// unknown node types degrade at instantiation time instead of breaking
/// the load.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AbilityData {
    name: String,
    blackboard: Vec<BlackboardVariable>,
    graph_jsons: Vec<String>,
}

impl AbilityData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blackboard: Vec::new(),
            graph_jsons: Vec::new(),
        }
    }

    /// Appends one flow graph, in the JSON document format of
    /// [`deserialize_graph`](crate::data::deserialize_graph).
    pub fn with_graph(mut self, json: impl Into<String>) -> Self {
        self.graph_jsons.push(json.into());
        self
    }

    /// Declares one ability-wide variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: i32) -> Self {
        self.blackboard.push(BlackboardVariable::new(key, value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blackboard(&self) -> &[BlackboardVariable] {
        &self.blackboard
    }

    pub fn graph_jsons(&self) -> &[String] {
        &self.graph_jsons
    }

    /// Serializes the pack to its bincode byte form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DataError> {
        encode_to_vec(self, standard()).map_err(|e| DataError::EncodeError(e.to_string()))
    }

    /// Saves the pack to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), DataError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| DataError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        file.write_all(&bytes).map_err(|e| DataError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Loads a pack from a file.
    pub fn from_file(path: &str) -> Result<Self, DataError> {
        let mut file = fs::File::open(path).map_err(|e| DataError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| DataError::Io {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a pack from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
        decode_from_slice(bytes, standard())
            .map(|(data, _)| data) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| DataError::DecodeError(e.to_string()))
    }
}
