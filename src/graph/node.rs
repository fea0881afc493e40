use crate::data::Position;
use crate::event::EventPayload;
use crate::flow::FlowState;
use crate::graph::eval::{NodeContext, Outputs, ValueContext};
use crate::graph::port::{Port, PortType};
use crate::graph::value::{Value, ValueKind};
use std::any::Any;
use tracing::{error, warn};

/// The implied flow inport on process nodes.
pub const PREVIOUS_PORT: &str = "previous";
/// The implied flow outport on entry and process nodes.
pub const NEXT_PORT: &str = "next";

/// The flat set of node shapes.
///
/// Entry nodes start a flow and carry the execution guard, process nodes
/// form the linear chain, value nodes are pure functions of their inports
/// and are re-evaluated on every pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Entry,
    Process,
    Value,
}

/// A named, kind-declared configuration field on a node instance.
///
/// Variables hold the values serialized with the graph; assigning a value
/// of the wrong kind is reported and ignored, never silently coerced.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    kind: ValueKind,
    value: Value,
}

impl Variable {
    fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value: Value::default_of(kind),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Behavior of a node type. One trait covers all three shapes; each shape
/// overrides the methods that apply to it and inherits no-op defaults for
/// the rest.
pub trait NodeLogic: Send {
    /// Entry guard: may this flow start with the given payload?
    fn can_execute(&self, payload: Option<&EventPayload>) -> bool {
        let _ = payload;
        true
    }

    /// One traversal visit of an entry or process node.
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let _ = cx;
        FlowState::Running
    }

    /// Pure evaluation of a value node's outports.
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let _ = (cx, out);
    }

    /// Whether a paused node accepts this resume context.
    fn accepts_resume(&self, context: &dyn Any) -> bool {
        let _ = context;
        false
    }

    /// Continues a paused node with an accepted context.
    fn resume(&mut self, context: &dyn Any, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let _ = (context, cx);
        FlowState::Running
    }

    /// Advances a paused node by one tick (time-based waits). The default
    /// keeps waiting.
    fn tick(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let _ = cx;
        FlowState::Pause
    }
}

/// One node instance inside a graph arena.
pub struct Node {
    id: i32,
    position: Position,
    type_name: String,
    kind: NodeKind,
    undefined: bool,
    pub(crate) inports: Vec<Port>,
    pub(crate) outports: Vec<Port>,
    variables: Vec<Variable>,
    pub(crate) logic: Option<Box<dyn NodeLogic>>,
}

impl Node {
    /// Placeholder for a serialized type the registry does not know.
    /// It keeps its identity for diagnostics but has no ports and no logic,
    /// so nothing can connect to it and traversal never reaches it.
    pub(crate) fn undefined(type_name: &str) -> Self {
        Self {
            id: 0,
            position: Position::default(),
            type_name: type_name.to_string(),
            kind: NodeKind::Process,
            undefined: true,
            inports: Vec::new(),
            outports: Vec::new(),
            variables: Vec::new(),
            logic: None,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    pub fn inports(&self) -> &[Port] {
        &self.inports
    }

    pub fn outports(&self) -> &[Port] {
        &self.outports
    }

    pub fn inport_index(&self, name: &str) -> Option<usize> {
        self.inports.iter().position(|p| p.name() == name)
    }

    pub fn outport_index(&self, name: &str) -> Option<usize> {
        self.outports.iter().position(|p| p.name() == name)
    }

    /// Adds a runtime-only inport. Dynamic ports participate in
    /// connections but are never serialized.
    pub fn add_dynamic_inport(&mut self, name: &str, kind: ValueKind) -> bool {
        if self.inport_index(name).is_some() {
            warn!(node = self.id, port = name, "duplicate inport name, not added");
            return false;
        }
        self.inports.push(Port::new(name, PortType::Value(kind), true));
        true
    }

    /// Adds a runtime-only outport.
    pub fn add_dynamic_outport(&mut self, name: &str, kind: ValueKind) -> bool {
        if self.outport_index(name).is_some() {
            warn!(node = self.id, port = name, "duplicate outport name, not added");
            return false;
        }
        self.outports.push(Port::new(name, PortType::Value(kind), true));
        true
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Assigns a variable. A kind mismatch is a logic error: it is reported
    /// and the stored value stays unchanged.
    pub fn set_variable(&mut self, name: &str, value: Value) -> bool {
        let id = self.id;
        let Some(variable) = self.variables.iter_mut().find(|v| v.name == name) else {
            warn!(node = id, field = name, "no such variable on this node type");
            return false;
        };
        if value.kind() != variable.kind {
            error!(
                node = id,
                field = name,
                expected = %variable.kind,
                found = %value.kind(),
                "variable kind mismatch, keeping current value"
            );
            return false;
        }
        variable.value = value;
        true
    }
}

/// Declared port on a node type.
#[derive(Debug, Clone, Copy)]
pub struct PortDecl {
    pub name: &'static str,
    pub ty: PortType,
}

/// Declared variable on a node type.
#[derive(Debug, Clone, Copy)]
pub struct VariableDecl {
    pub name: &'static str,
    pub kind: ValueKind,
}

type BuildFn = Box<dyn Fn() -> Box<dyn NodeLogic> + Send + Sync>;

/// Compile-time description of a node type: its registry tag, shape,
/// declared ports and variables, and how to build its logic object.
///
/// Descriptors are what the registry stores and what embedders provide to
/// add custom game nodes.
pub struct NodeDescriptor {
    type_name: &'static str,
    kind: NodeKind,
    inports: Vec<PortDecl>,
    outports: Vec<PortDecl>,
    variables: Vec<VariableDecl>,
    build: BuildFn,
}

impl NodeDescriptor {
    pub fn entry<F>(type_name: &'static str, build: F) -> Self
    where
        F: Fn() -> Box<dyn NodeLogic> + Send + Sync + 'static,
    {
        Self::new(type_name, NodeKind::Entry, build)
    }

    pub fn process<F>(type_name: &'static str, build: F) -> Self
    where
        F: Fn() -> Box<dyn NodeLogic> + Send + Sync + 'static,
    {
        Self::new(type_name, NodeKind::Process, build)
    }

    pub fn value<F>(type_name: &'static str, build: F) -> Self
    where
        F: Fn() -> Box<dyn NodeLogic> + Send + Sync + 'static,
    {
        Self::new(type_name, NodeKind::Value, build)
    }

    fn new<F>(type_name: &'static str, kind: NodeKind, build: F) -> Self
    where
        F: Fn() -> Box<dyn NodeLogic> + Send + Sync + 'static,
    {
        Self {
            type_name,
            kind,
            inports: Vec::new(),
            outports: Vec::new(),
            variables: Vec::new(),
            build: Box::new(build),
        }
    }

    pub fn with_inport(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.inports.push(PortDecl {
            name,
            ty: PortType::Value(kind),
        });
        self
    }

    pub fn with_outport(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.outports.push(PortDecl {
            name,
            ty: PortType::Value(kind),
        });
        self
    }

    /// Declares an extra flow outport (a branch target besides `next`).
    pub fn with_flow_outport(mut self, name: &'static str) -> Self {
        self.outports.push(PortDecl {
            name,
            ty: PortType::Flow,
        });
        self
    }

    pub fn with_variable(mut self, name: &'static str, kind: ValueKind) -> Self {
        self.variables.push(VariableDecl { name, kind });
        self
    }

    pub fn type_name(&self) -> &str {
        self.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Builds a default-constructed node instance: implied flow ports per
    /// shape, declared ports, variables at their kind defaults.
    pub fn instantiate(&self) -> Node {
        let mut inports = Vec::new();
        let mut outports = Vec::new();
        match self.kind {
            NodeKind::Entry => outports.push(Port::flow(NEXT_PORT)),
            NodeKind::Process => {
                inports.push(Port::flow(PREVIOUS_PORT));
                outports.push(Port::flow(NEXT_PORT));
            }
            NodeKind::Value => {}
        }
        for decl in &self.inports {
            inports.push(Port::new(decl.name, decl.ty, false));
        }
        for decl in &self.outports {
            outports.push(Port::new(decl.name, decl.ty, false));
        }
        let variables = self
            .variables
            .iter()
            .map(|decl| Variable::new(decl.name, decl.kind))
            .collect();
        Node {
            id: 0,
            position: Position::default(),
            type_name: self.type_name.to_string(),
            kind: self.kind,
            undefined: false,
            inports,
            outports,
            variables,
            logic: Some((self.build)()),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("undefined", &self.undefined)
            .field("inports", &self.inports)
            .field("outports", &self.outports)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("inports", &self.inports)
            .field("outports", &self.outports)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}
