use std::any::Any;
use std::sync::Arc;

use tracing::{info, warn};

use crate::data::NodeRegistry;
use crate::flow::FlowState;
use crate::graph::{NodeContext, NodeDescriptor, NodeLogic, ValueKind};

/// Writes its pulled text to the log.
struct LogLogic;

impl NodeLogic for LogLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let text = cx.input("text").into_string();
        info!(target: "waza::nodes", "{text}");
        FlowState::Running
    }
}

/// Cancels the whole flow.
struct AbortLogic;

impl NodeLogic for AbortLogic {
    fn do_logic(&mut self, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        FlowState::Abort
    }
}

/// Parks the flow until any resume context arrives.
struct PauseLogic;

impl NodeLogic for PauseLogic {
    fn do_logic(&mut self, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        FlowState::Pause
    }

    fn accepts_resume(&self, _context: &dyn Any) -> bool {
        true
    }

    fn resume(&mut self, _context: &dyn Any, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        FlowState::Running
    }
}

/// Pulls a condition and schedules the `true` or `false` branch.
struct IfLogic;

impl NodeLogic for IfLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let condition = cx.input("condition").into_bool();
        let branch = if condition { "true" } else { "false" };
        cx.push_branch(branch);
        FlowState::Running
    }
}

/// Writes a pulled value into the variable scopes under a configured key.
struct SetVariableLogic;

impl NodeLogic for SetVariableLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let key = cx.variable("key").into_string();
        if key.is_empty() {
            warn!(node = cx.node_id(), "setVariableNode without a key");
            return FlowState::Running;
        }
        let value = cx.input("value").into_int();
        cx.write_variable(&key, value);
        FlowState::Running
    }
}

/// Pauses for a configured number of ticks.
struct WaitLogic {
    remaining: i32,
}

impl NodeLogic for WaitLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        self.remaining = cx.variable("turns").into_int();
        if self.remaining <= 0 {
            FlowState::Running
        } else {
            FlowState::Pause
        }
    }

    fn tick(&mut self, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        self.remaining -= 1;
        if self.remaining <= 0 {
            FlowState::Running
        } else {
            FlowState::Pause
        }
    }
}

/// Buffers its configured message as a string event.
struct RaiseEventLogic;

impl NodeLogic for RaiseEventLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let message = cx.variable("message").into_string();
        cx.enqueue_event(Arc::new(message));
        FlowState::Running
    }
}

pub(super) fn register_action_nodes(registry: &mut NodeRegistry) {
    registry.register(
        NodeDescriptor::process("logNode", || Box::new(LogLogic))
            .with_inport("text", ValueKind::String),
    );
    registry.register(NodeDescriptor::process("abortNode", || Box::new(AbortLogic)));
    registry.register(NodeDescriptor::process("pauseNode", || Box::new(PauseLogic)));
    registry.register(
        NodeDescriptor::process("ifNode", || Box::new(IfLogic))
            .with_inport("condition", ValueKind::Bool)
            .with_flow_outport("true")
            .with_flow_outport("false"),
    );
    registry.register(
        NodeDescriptor::process("setVariableNode", || Box::new(SetVariableLogic))
            .with_variable("key", ValueKind::String)
            .with_inport("value", ValueKind::Int),
    );
    registry.register(
        NodeDescriptor::process("waitNode", || Box::new(WaitLogic { remaining: 0 }))
            .with_variable("turns", ValueKind::Int),
    );
    registry.register(
        NodeDescriptor::process("raiseEventNode", || Box::new(RaiseEventLogic))
            .with_variable("message", ValueKind::String),
    );
}
