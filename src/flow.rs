//! Single-graph execution: the flow state machine and its blackboard.

use std::any::Any;
use std::fmt;

use tracing::{error, warn};

use crate::ability::VariableStore;
use crate::event::{EventPayload, EventQueue};
use crate::graph::{AbilityGraph, NodeContext};
use crate::stats::{OwnerId, StatOwnerRepository};

/// Lifecycle of a flow.
///
/// A flow starts `Clean`, runs node by node while `Running`, and ends in
/// `Pause` (waiting for a resume), `Abort` (cancelled by a node) or `Done`
/// (ran out of nodes). `execute` is legal from `Clean`, `Abort` and `Done`;
/// `resume` and `tick` only from `Pause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Clean,
    Running,
    Pause,
    Abort,
    Done,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Clean => "Clean",
            FlowState::Running => "Running",
            FlowState::Pause => "Pause",
            FlowState::Abort => "Abort",
            FlowState::Done => "Done",
        };
        write!(f, "{name}")
    }
}

/// Borrowed surroundings a flow runs inside.
///
/// Standalone flows run with an empty scope; under an [`crate::system::AbilitySystem`]
/// the scope carries the stat repository, the event buffer and the owning
/// ability's variables.
#[derive(Default)]
pub struct FlowScope<'w> {
    pub owners: Option<&'w mut StatOwnerRepository>,
    pub events: Option<&'w mut EventQueue>,
    pub ability_vars: Option<&'w mut VariableStore>,
}

/// One executable graph together with its run state.
///
/// The flow owns a private copy of the graph's blackboard template, its
/// optional actor and the event payload that started it. Driving the flow
/// directly with [`execute`](AbilityFlow::execute) runs it to the next
/// terminal state in one call; the runner instead advances it one node at
/// a time through the crate-internal step hooks.
pub struct AbilityFlow {
    graph: AbilityGraph,
    blackboard: VariableStore,
    actor: Option<OwnerId>,
    payload: Option<EventPayload>,
    state: FlowState,
}

impl AbilityFlow {
    pub fn new(graph: AbilityGraph) -> Self {
        let blackboard = VariableStore::from_template(graph.blackboard());
        Self {
            graph,
            blackboard,
            actor: None,
            payload: None,
            state: FlowState::Clean,
        }
    }

    /// Runs the flow from its first entry node until it pauses, aborts or
    /// finishes. Calling this while the flow is running or paused is an
    /// error and leaves the flow untouched.
    pub fn execute(&mut self, scope: &mut FlowScope<'_>) {
        match self.state {
            FlowState::Clean | FlowState::Abort | FlowState::Done => {}
            FlowState::Running | FlowState::Pause => {
                error!(state = %self.state, "execute is not legal from this state");
                return;
            }
        }
        if !self.can_execute() {
            error!("entry node refused the payload, not starting");
            return;
        }
        self.graph.reset(0);
        self.state = FlowState::Running;
        self.iterate(scope);
    }

    /// Hands a resume context to the paused node and, if it releases the
    /// flow, keeps running. A context the node does not accept is reported
    /// and ignored, leaving the flow paused.
    pub fn resume(&mut self, context: &dyn Any, scope: &mut FlowScope<'_>) {
        if self.state != FlowState::Pause {
            error!(state = %self.state, "resume is only legal while paused");
            return;
        }
        if !self.check_resume(context) {
            error!("resume context does not match the paused node");
            return;
        }
        let state = self.step_resume(context, scope);
        if state == FlowState::Running {
            self.iterate(scope);
        }
    }

    /// Gives the paused node a tick. Most pausing nodes wait for an
    /// external resume and stay paused; time-based ones count down and
    /// may release the flow.
    pub fn tick(&mut self, scope: &mut FlowScope<'_>) {
        if self.state != FlowState::Pause {
            error!(state = %self.state, "tick is only legal while paused");
            return;
        }
        let state = self.step_tick(scope);
        if state == FlowState::Running {
            self.iterate(scope);
        }
    }

    /// Puts the flow back to `Clean`: cursor and pending branches cleared,
    /// latched outputs dropped, blackboard reseeded from its template and
    /// the payload released. The actor is kept.
    pub fn reset(&mut self) {
        self.graph.reset(0);
        self.blackboard = VariableStore::from_template(self.graph.blackboard());
        self.payload = None;
        self.state = FlowState::Clean;
    }

    /// Whether the first entry node accepts the stored payload.
    pub fn can_execute(&self) -> bool {
        self.can_accept(self.payload.as_ref())
    }

    /// Whether the first entry node would accept the given payload. False
    /// when the graph has no entry node at all.
    pub fn can_accept(&self, payload: Option<&EventPayload>) -> bool {
        let Some(index) = self.graph.entry_nodes().next() else {
            return false;
        };
        self.graph
            .node(index)
            .and_then(|node| node.logic.as_deref())
            .is_some_and(|logic| logic.can_execute(payload))
    }

    pub fn set_payload(&mut self, payload: Option<EventPayload>) {
        self.payload = payload;
    }

    pub fn payload(&self) -> Option<&EventPayload> {
        self.payload.as_ref()
    }

    pub fn set_actor(&mut self, actor: Option<OwnerId>) {
        self.actor = actor;
    }

    pub fn actor(&self) -> Option<OwnerId> {
        self.actor
    }

    /// Overrides one blackboard variable on the live flow. Unknown keys
    /// are reported and inserted anyway.
    pub fn set_blackboard_variable(&mut self, key: &str, value: i32) {
        self.blackboard.override_value(key, value);
    }

    /// Reads one blackboard variable, 0 with a report when missing.
    pub fn blackboard_variable(&self, key: &str) -> i32 {
        self.blackboard.get(key)
    }

    pub fn blackboard(&self) -> &VariableStore {
        &self.blackboard
    }

    pub fn current_state(&self) -> FlowState {
        self.state
    }

    /// Authored id of the node the cursor sits on, if any.
    pub fn current_node_id(&self) -> Option<i32> {
        let index = self.graph.current()?;
        self.graph.node(index).map(|node| node.id())
    }

    pub fn graph(&self) -> &AbilityGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut AbilityGraph {
        &mut self.graph
    }

    fn iterate(&mut self, scope: &mut FlowScope<'_>) {
        while self.graph.move_next() {
            let state = self.run_current(scope);
            if state != FlowState::Running {
                self.state = state;
                return;
            }
        }
        self.state = FlowState::Done;
    }

    fn run_current(&mut self, scope: &mut FlowScope<'_>) -> FlowState {
        let Some(index) = self.graph.current() else {
            warn!("no current node to run");
            return FlowState::Running;
        };
        let Some(mut logic) = self.graph.take_logic(index) else {
            // Placeholder nodes carry no logic and are skipped.
            warn!(node = self.current_node_id(), "node has no logic attached");
            return FlowState::Running;
        };
        let Self {
            graph,
            blackboard,
            actor,
            payload,
            ..
        } = self;
        let mut cx = NodeContext::new(graph, index, *actor, payload.as_ref(), blackboard, scope);
        let state = logic.do_logic(&mut cx);
        self.graph.put_logic(index, logic);
        state
    }

    /// Advances the cursor for one runner step. Starting from `Clean`
    /// arms the graph first; a terminal flow refuses to advance.
    pub(crate) fn step_move_next(&mut self) -> bool {
        match self.state {
            FlowState::Clean => {
                self.graph.reset(0);
                self.state = FlowState::Running;
                self.graph.move_next()
            }
            FlowState::Running => self.graph.move_next(),
            FlowState::Pause | FlowState::Abort | FlowState::Done => false,
        }
    }

    /// Runs the current node for one runner step and records the state.
    pub(crate) fn step_run_current(&mut self, scope: &mut FlowScope<'_>) -> FlowState {
        let state = self.run_current(scope);
        self.state = state;
        state
    }

    pub(crate) fn mark_done(&mut self) {
        self.state = FlowState::Done;
    }

    /// Whether the paused node accepts this resume context.
    pub(crate) fn check_resume(&self, context: &dyn Any) -> bool {
        self.graph
            .current()
            .and_then(|index| self.graph.node(index))
            .and_then(|node| node.logic.as_deref())
            .is_some_and(|logic| logic.accepts_resume(context))
    }

    pub(crate) fn step_resume(
        &mut self,
        context: &dyn Any,
        scope: &mut FlowScope<'_>,
    ) -> FlowState {
        let Some(index) = self.graph.current() else {
            warn!("resume with no current node");
            self.state = FlowState::Abort;
            return FlowState::Abort;
        };
        let Some(mut logic) = self.graph.take_logic(index) else {
            warn!(node = self.current_node_id(), "resume on a node without logic");
            self.state = FlowState::Abort;
            return FlowState::Abort;
        };
        let Self {
            graph,
            blackboard,
            actor,
            payload,
            ..
        } = self;
        let mut cx = NodeContext::new(graph, index, *actor, payload.as_ref(), blackboard, scope);
        let state = logic.resume(context, &mut cx);
        self.graph.put_logic(index, logic);
        self.state = state;
        state
    }

    pub(crate) fn step_tick(&mut self, scope: &mut FlowScope<'_>) -> FlowState {
        let Some(index) = self.graph.current() else {
            warn!("tick with no current node");
            self.state = FlowState::Abort;
            return FlowState::Abort;
        };
        let Some(mut logic) = self.graph.take_logic(index) else {
            warn!(node = self.current_node_id(), "tick on a node without logic");
            self.state = FlowState::Abort;
            return FlowState::Abort;
        };
        let Self {
            graph,
            blackboard,
            actor,
            payload,
            ..
        } = self;
        let mut cx = NodeContext::new(graph, index, *actor, payload.as_ref(), blackboard, scope);
        let state = logic.tick(&mut cx);
        self.graph.put_logic(index, logic);
        self.state = state;
        state
    }
}
