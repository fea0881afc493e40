use crate::data::NodeRegistry;
use crate::graph::{NodeDescriptor, NodeLogic};

/// Unconditional entry point. Accepts any payload, including none.
struct StartLogic;

impl NodeLogic for StartLogic {}

pub(super) fn register_entry_nodes(registry: &mut NodeRegistry) {
    registry.register(NodeDescriptor::entry("startNode", || Box::new(StartLogic)));
}
