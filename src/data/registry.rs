use ahash::AHashMap;
use tracing::error;

use crate::graph::{ConverterTable, Node, NodeDescriptor};

/// The closed set of node types a graph may contain, plus the converter
/// table every deserialized graph starts from.
///
/// Registering a descriptor under an existing type name replaces it, so
/// embedders can override a built-in node wholesale.
pub struct NodeRegistry {
    descriptors: AHashMap<String, NodeDescriptor>,
    converters: ConverterTable,
}

impl NodeRegistry {
    /// A registry without any node types. Converters start at the
    /// built-in defaults.
    pub fn new() -> Self {
        Self {
            descriptors: AHashMap::new(),
            converters: ConverterTable::with_defaults(),
        }
    }

    /// A registry with every built-in node type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::nodes::register_default_nodes(&mut registry);
        registry
    }

    pub fn register(&mut self, descriptor: NodeDescriptor) {
        self.descriptors
            .insert(descriptor.type_name().to_owned(), descriptor);
    }

    pub fn resolve(&self, type_name: &str) -> Option<&NodeDescriptor> {
        self.descriptors.get(type_name)
    }

    /// Builds a node instance for a serialized type tag. Unknown tags are
    /// reported and produce an inert placeholder that keeps its identity
    /// through a round-trip.
    pub fn instantiate(&self, type_name: &str) -> Node {
        match self.descriptors.get(type_name) {
            Some(descriptor) => descriptor.instantiate(),
            None => {
                error!(type_name, "Unknown node type, inserting a placeholder");
                Node::undefined(type_name)
            }
        }
    }

    pub fn converters(&self) -> &ConverterTable {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterTable {
        &mut self.converters
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
