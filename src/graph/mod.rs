//! The node-graph model: values, ports, nodes and the traversable arena.

pub mod convert;
pub mod eval;
pub mod node;
pub mod port;
pub mod value;

pub use convert::{ConvertFn, ConverterTable};
pub use eval::{NodeContext, Outputs, ValueContext};
pub use node::{NEXT_PORT, Node, NodeDescriptor, NodeKind, NodeLogic, PREVIOUS_PORT, Variable};
pub use port::{Port, PortRef, PortType};
pub use value::{Value, ValueKind};

use crate::data::BlackboardVariable;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Before the first `move_next` since the last reset.
    Clean,
    At(usize),
    End,
}

/// An index-addressed node arena with flow traversal state.
///
/// Nodes are never removed, so arena indices stay valid for the life of the
/// graph and connections can hold plain indices. Traversal is a cursor plus
/// an explicit stack of pending nodes; `move_next` pops that stack before
/// falling through to the current node's `next` edge, which is what lets
/// node logic schedule branch targets and subroutine-like jumps.
#[derive(Debug)]
pub struct AbilityGraph {
    pub(crate) nodes: Vec<Node>,
    blackboard: Vec<BlackboardVariable>,
    converters: ConverterTable,
    cursor: Cursor,
    pending: Vec<usize>,
    entry_index: usize,
}

impl AbilityGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            blackboard: Vec::new(),
            converters: ConverterTable::with_defaults(),
            cursor: Cursor::Clean,
            pending: Vec::new(),
            entry_index: 0,
        }
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Arena index of the node with the given persistent id.
    pub fn node_index_by_id(&self, id: i32) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Entry nodes in arena order.
    pub fn entry_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind() == NodeKind::Entry)
            .map(|(i, _)| i)
    }

    pub fn converters(&self) -> &ConverterTable {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterTable {
        &mut self.converters
    }

    pub(crate) fn set_converters(&mut self, converters: ConverterTable) {
        self.converters = converters;
    }

    /// Graph-scope blackboard declarations (the flow seeds its own map from
    /// these on reset).
    pub fn blackboard(&self) -> &[BlackboardVariable] {
        &self.blackboard
    }

    pub fn declare_blackboard_variable(&mut self, key: &str, value: i32) {
        self.blackboard.push(BlackboardVariable {
            key: key.to_string(),
            value,
        });
    }

    pub(crate) fn set_blackboard(&mut self, blackboard: Vec<BlackboardVariable>) {
        self.blackboard = blackboard;
    }

    /// Connects an outport of `from_node` to an inport of `to_node`.
    ///
    /// Returns whether the edge was made. Failures are authoring errors:
    /// they are logged and the graph is left unchanged.
    pub fn connect(&mut self, from_node: usize, from_port: &str, to_node: usize, to_port: &str) -> bool {
        let Some(from) = self.nodes.get(from_node) else {
            error!(index = from_node, "connect: source node index out of range");
            return false;
        };
        let Some(to) = self.nodes.get(to_node) else {
            error!(index = to_node, "connect: target node index out of range");
            return false;
        };
        let Some(out_index) = from.outport_index(from_port) else {
            error!(node = from.id(), port = from_port, "connect: no such outport");
            return false;
        };
        let Some(in_index) = to.inport_index(to_port) else {
            error!(node = to.id(), port = to_port, "connect: no such inport");
            return false;
        };

        let out_ty = from.outports[out_index].ty();
        let in_ty = to.inports[in_index].ty();
        match (out_ty, in_ty) {
            (PortType::Flow, PortType::Flow) => {
                if from.outports[out_index].is_connected() {
                    error!(node = from.id(), port = from_port, "flow outport already connected");
                    return false;
                }
                if to.inports[in_index].is_connected() {
                    error!(node = to.id(), port = to_port, "flow inport already connected");
                    return false;
                }
            }
            (PortType::Value(_), PortType::Value(_)) => {
                // Kind mismatches are resolved at read time via the
                // converter table, so any value pair may connect.
            }
            _ => {
                error!(
                    from = from.id(),
                    to = to.id(),
                    "cannot connect a flow port to a value port"
                );
                return false;
            }
        }

        self.nodes[from_node].outports[out_index].links.push(PortRef {
            node: to_node,
            port: in_index,
        });
        self.nodes[to_node].inports[in_index].links.push(PortRef {
            node: from_node,
            port: out_index,
        });
        true
    }

    /// Puts the traversal back before the start and selects the entry node.
    /// Latched outport values from the previous run are discarded.
    pub fn reset(&mut self, entry_index: usize) {
        let entry_count = self.entry_nodes().count();
        self.entry_index = if entry_index == 0 || entry_index < entry_count {
            entry_index
        } else {
            warn!(
                requested = entry_index,
                available = entry_count,
                "entry index out of range, falling back to 0"
            );
            0
        };
        self.cursor = Cursor::Clean;
        self.pending.clear();
        for node in &mut self.nodes {
            for port in &mut node.outports {
                port.latched = None;
            }
        }
    }

    /// Advances the cursor by one node. The first call lands on the
    /// selected entry node; later calls pop the pending stack first and
    /// only then follow the current node's `next` edge. Returns false once
    /// the traversal has ended.
    pub fn move_next(&mut self) -> bool {
        match self.cursor {
            Cursor::Clean => {
                let entry = self.entry_nodes().nth(self.entry_index);
                match entry {
                    Some(entry) => {
                        self.cursor = Cursor::At(entry);
                        true
                    }
                    None => {
                        debug!("graph has no entry node to start from");
                        self.cursor = Cursor::End;
                        false
                    }
                }
            }
            Cursor::At(index) => {
                if let Some(pending) = self.pending.pop() {
                    self.cursor = Cursor::At(pending);
                    true
                } else if let Some(next) = self.next_of(index) {
                    self.cursor = Cursor::At(next);
                    true
                } else {
                    self.cursor = Cursor::End;
                    false
                }
            }
            Cursor::End => false,
        }
    }

    /// The node the cursor is on, if the traversal is mid-run.
    pub fn current(&self) -> Option<usize> {
        match self.cursor {
            Cursor::At(index) => Some(index),
            _ => None,
        }
    }

    /// Schedules a node to run before the current node's `next` edge is
    /// followed. Last pushed runs first.
    pub fn push_pending(&mut self, index: usize) {
        if index < self.nodes.len() {
            self.pending.push(index);
        } else {
            error!(index, "push_pending: node index out of range");
        }
    }

    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    /// Target of the current flow edge leaving `index` through `next`.
    fn next_of(&self, index: usize) -> Option<usize> {
        let node = &self.nodes[index];
        let out = node.outport_index(NEXT_PORT)?;
        node.outports[out].links.first().map(|r| r.node)
    }

    pub(crate) fn take_logic(&mut self, index: usize) -> Option<Box<dyn NodeLogic>> {
        self.nodes.get_mut(index).and_then(|n| n.logic.take())
    }

    pub(crate) fn put_logic(&mut self, index: usize, logic: Box<dyn NodeLogic>) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.logic = Some(logic);
        }
    }
}

impl Default for AbilityGraph {
    fn default() -> Self {
        Self::new()
    }
}
