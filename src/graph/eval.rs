use crate::ability::VariableStore;
use crate::event::EventPayload;
use crate::flow::FlowScope;
use crate::graph::node::NodeKind;
use crate::graph::port::{Port, PortRef, PortType};
use crate::graph::value::{Value, ValueKind};
use crate::graph::AbilityGraph;
use crate::stats::{OwnerId, StatOwnerRepository};
use tracing::{debug, warn};

/// Read-only context handed to a value node's `evaluate`.
///
/// Pulling an input resolves the connected outport on demand: value-node
/// sources are re-evaluated (pure, never memoized), entry/process sources
/// yield their latched cell. The visiting stack guards against cycles in
/// the value edges; a re-entered port reads as its declared default.
pub struct ValueContext<'a> {
    graph: &'a AbilityGraph,
    node: usize,
    actor: Option<OwnerId>,
    payload: Option<&'a EventPayload>,
    blackboard: &'a VariableStore,
    ability_vars: Option<&'a VariableStore>,
    visiting: &'a mut Vec<PortRef>,
}

impl<'a> ValueContext<'a> {
    /// Pulls one of this node's inports by name.
    pub fn input(&mut self, name: &str) -> Value {
        match self.graph.nodes[self.node].inport_index(name) {
            Some(index) => self.resolve_inport(self.node, index),
            None => {
                warn!(
                    node = self.graph.nodes[self.node].id(),
                    port = name,
                    "input: no such inport"
                );
                Value::Int(0)
            }
        }
    }

    /// This node's configuration variable by name.
    pub fn variable(&self, name: &str) -> Value {
        match self.graph.nodes[self.node].variable(name) {
            Some(variable) => variable.value().clone(),
            None => {
                warn!(
                    node = self.graph.nodes[self.node].id(),
                    field = name,
                    "variable: no such variable"
                );
                Value::Int(0)
            }
        }
    }

    pub fn actor(&self) -> Option<OwnerId> {
        self.actor
    }

    pub fn payload(&self) -> Option<&EventPayload> {
        self.payload
    }

    /// Looks a key up in the ability variables first, then the flow
    /// blackboard. Quiet on a miss so callers can pick their own fallback.
    pub fn read_variable(&self, key: &str) -> Option<i32> {
        if let Some(vars) = self.ability_vars
            && let Some(value) = vars.try_get(key)
        {
            return Some(value);
        }
        self.blackboard.try_get(key)
    }

    pub fn node_id(&self) -> i32 {
        self.graph.nodes[self.node].id()
    }

    fn resolve_inport(&mut self, node: usize, port: usize) -> Value {
        let (want, source) = {
            let inport = &self.graph.nodes[node].inports[port];
            let want = match inport.ty() {
                PortType::Value(kind) => kind,
                PortType::Flow => {
                    warn!(
                        node = self.graph.nodes[node].id(),
                        port = inport.name(),
                        "cannot pull a value through a flow port"
                    );
                    return Value::Int(0);
                }
            };
            (want, inport.links.first().copied())
        };
        let Some(source) = source else {
            return Value::default_of(want);
        };
        let Some(got) = self.resolve_outport(source) else {
            return Value::default_of(want);
        };
        if got.kind() == want {
            return got;
        }
        match self.graph.converters().get(got.kind(), want) {
            Some(convert) => convert(&got),
            None => {
                debug!(from = %got.kind(), to = %want, "no converter registered, using default");
                Value::default_of(want)
            }
        }
    }

    fn resolve_outport(&mut self, at: PortRef) -> Option<Value> {
        let node = &self.graph.nodes[at.node];
        let port = node.outports.get(at.port)?;
        let kind = match port.ty() {
            PortType::Value(kind) => kind,
            PortType::Flow => return None,
        };
        if node.kind() != NodeKind::Value {
            return Some(port.latched.clone().unwrap_or_else(|| Value::default_of(kind)));
        }
        if self.visiting.contains(&at) {
            warn!(
                node = node.id(),
                port = port.name(),
                "cycle in value edges, using default"
            );
            return Some(Value::default_of(kind));
        }
        let Some(logic) = node.logic.as_deref() else {
            return Some(Value::default_of(kind));
        };
        self.visiting.push(at);
        let mut out = Outputs::new(&node.outports);
        let mut child = ValueContext {
            graph: self.graph,
            node: at.node,
            actor: self.actor,
            payload: self.payload,
            blackboard: self.blackboard,
            ability_vars: self.ability_vars,
            visiting: &mut *self.visiting,
        };
        logic.evaluate(&mut child, &mut out);
        self.visiting.pop();
        Some(out.take(at.port, kind))
    }
}

/// Collects the outputs a value node produces during one evaluation.
pub struct Outputs<'a> {
    ports: &'a [Port],
    values: Vec<Option<Value>>,
}

impl<'a> Outputs<'a> {
    fn new(ports: &'a [Port]) -> Self {
        Self {
            ports,
            values: vec![None; ports.len()],
        }
    }

    /// Sets one output by outport name. A kind mismatch against the
    /// declared outport is reported and the value dropped.
    pub fn set(&mut self, name: &str, value: Value) {
        let Some(index) = self.ports.iter().position(|p| p.name() == name) else {
            warn!(port = name, "output: no such outport");
            return;
        };
        match self.ports[index].ty() {
            PortType::Value(kind) if kind == value.kind() => self.values[index] = Some(value),
            PortType::Value(kind) => warn!(
                port = name,
                expected = %kind,
                found = %value.kind(),
                "output kind mismatch, value dropped"
            ),
            PortType::Flow => warn!(port = name, "cannot set a value on a flow port"),
        }
    }

    fn take(mut self, port: usize, want: ValueKind) -> Value {
        self.values
            .get_mut(port)
            .and_then(Option::take)
            .unwrap_or_else(|| Value::default_of(want))
    }
}

/// Mutable context handed to entry/process node logic for one visit.
///
/// Everything a node may touch flows through here: its inports and
/// variables, its outport cells, the two blackboard scopes, the payload
/// and actor, the event buffer and (under a system) the stat repository.
pub struct NodeContext<'a, 'w> {
    graph: &'a mut AbilityGraph,
    node: usize,
    actor: Option<OwnerId>,
    payload: Option<&'a EventPayload>,
    blackboard: &'a mut VariableStore,
    scope: &'a mut FlowScope<'w>,
}

impl<'a, 'w> NodeContext<'a, 'w> {
    pub(crate) fn new(
        graph: &'a mut AbilityGraph,
        node: usize,
        actor: Option<OwnerId>,
        payload: Option<&'a EventPayload>,
        blackboard: &'a mut VariableStore,
        scope: &'a mut FlowScope<'w>,
    ) -> Self {
        Self {
            graph,
            node,
            actor,
            payload,
            blackboard,
            scope,
        }
    }

    /// Pulls one of this node's inports by name.
    pub fn input(&self, name: &str) -> Value {
        let mut visiting = Vec::new();
        let mut cx = ValueContext {
            graph: &*self.graph,
            node: self.node,
            actor: self.actor,
            payload: self.payload,
            blackboard: &*self.blackboard,
            ability_vars: self.scope.ability_vars.as_deref(),
            visiting: &mut visiting,
        };
        cx.input(name)
    }

    /// Latches a value on one of this node's outports so downstream nodes
    /// can read it for the rest of the run.
    pub fn set_output(&mut self, name: &str, value: Value) {
        let node = &mut self.graph.nodes[self.node];
        let id = node.id();
        let Some(index) = node.outport_index(name) else {
            warn!(node = id, port = name, "set_output: no such outport");
            return;
        };
        let port = &mut node.outports[index];
        match port.ty() {
            PortType::Value(kind) if kind == value.kind() => port.latched = Some(value),
            PortType::Value(kind) => warn!(
                node = id,
                port = name,
                expected = %kind,
                found = %value.kind(),
                "set_output kind mismatch, value dropped"
            ),
            PortType::Flow => warn!(node = id, port = name, "cannot latch a value on a flow port"),
        }
    }

    /// This node's configuration variable by name.
    pub fn variable(&self, name: &str) -> Value {
        match self.graph.nodes[self.node].variable(name) {
            Some(variable) => variable.value().clone(),
            None => {
                warn!(
                    node = self.graph.nodes[self.node].id(),
                    field = name,
                    "variable: no such variable"
                );
                Value::Int(0)
            }
        }
    }

    pub fn actor(&self) -> Option<OwnerId> {
        self.actor
    }

    pub fn payload(&self) -> Option<&EventPayload> {
        self.payload
    }

    pub fn node_id(&self) -> i32 {
        self.graph.nodes[self.node].id()
    }

    /// Looks a key up in the ability variables first, then the flow
    /// blackboard.
    pub fn read_variable(&self, key: &str) -> Option<i32> {
        if let Some(vars) = self.scope.ability_vars.as_deref()
            && let Some(value) = vars.try_get(key)
        {
            return Some(value);
        }
        self.blackboard.try_get(key)
    }

    /// Writes a key: the ability variables win when they already hold it,
    /// otherwise the flow blackboard takes the value.
    pub fn write_variable(&mut self, key: &str, value: i32) {
        if let Some(vars) = self.scope.ability_vars.as_deref_mut()
            && vars.has(key)
        {
            vars.set(key, value);
            return;
        }
        self.blackboard.set(key, value);
    }

    /// Buffers an event for the next flush. Without a bound event queue
    /// (standalone flows) the event is dropped.
    pub fn enqueue_event(&mut self, event: EventPayload) {
        match self.scope.events.as_deref_mut() {
            Some(queue) => queue.enqueue(event),
            None => debug!("no event queue bound, event dropped"),
        }
    }

    /// The stat repository, when running under a system.
    pub fn owners_mut(&mut self) -> Option<&mut StatOwnerRepository> {
        self.scope.owners.as_deref_mut()
    }

    /// Schedules the node connected to the named flow outport to run next.
    /// Returns false when the branch is unconnected or not a flow port.
    pub fn push_branch(&mut self, name: &str) -> bool {
        let target = {
            let node = &self.graph.nodes[self.node];
            let Some(index) = node.outport_index(name) else {
                warn!(node = node.id(), port = name, "push_branch: no such outport");
                return false;
            };
            if node.outports[index].ty() != PortType::Flow {
                warn!(node = node.id(), port = name, "push_branch: not a flow outport");
                return false;
            }
            match node.outports[index].links.first() {
                Some(link) => link.node,
                None => {
                    debug!(node = node.id(), port = name, "push_branch: branch unconnected");
                    return false;
                }
            }
        };
        self.graph.push_pending(target);
        true
    }
}
