use crate::graph::value::{Value, ValueKind};

/// What a port endpoint carries: control flow or a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// Control edge endpoint. Carries no value; flow ports link the
    /// traversal order of entry/process nodes.
    Flow,
    Value(ValueKind),
}

/// Arena address of a port on the opposite polarity: `node` indexes the
/// graph's node list, `port` indexes that node's inports (when stored on an
/// outport) or outports (when stored on an inport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef {
    pub node: usize,
    pub port: usize,
}

/// One connection endpoint on a node.
///
/// Polarity is positional: a port is an inport or an outport depending on
/// which of the node's two lists it lives in. Identity within a node is
/// (name, is_dynamic); names are unique per polarity.
#[derive(Debug, Clone)]
pub struct Port {
    name: String,
    ty: PortType,
    is_dynamic: bool,
    /// Connected opposite-polarity ports, in connection order.
    pub(crate) links: Vec<PortRef>,
    /// Last value written by entry/process node logic. Value nodes never
    /// latch; their outputs are recomputed on every pull.
    pub(crate) latched: Option<Value>,
}

impl Port {
    pub(crate) fn flow(name: &str) -> Self {
        Self::new(name, PortType::Flow, false)
    }

    pub(crate) fn new(name: &str, ty: PortType, is_dynamic: bool) -> Self {
        Self {
            name: name.to_string(),
            ty,
            is_dynamic,
            links: Vec::new(),
            latched: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> PortType {
        self.ty
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    pub fn connections(&self) -> &[PortRef] {
        &self.links
    }

    pub fn is_connected(&self) -> bool {
        !self.links.is_empty()
    }
}
