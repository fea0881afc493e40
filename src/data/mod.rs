//! The authoring boundary: JSON graph documents, binary ability packs
//! and the node type registry.

pub mod asset;
pub mod codec;
pub mod registry;
pub mod schema;

pub use asset::AbilityData;
pub use codec::{deserialize_graph, serialize_graph};
pub use registry::NodeRegistry;
pub use schema::{BlackboardVariable, EdgeData, GraphData, NodeData, Position};
