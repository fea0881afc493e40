use std::any::Any;

use crate::flow::{AbilityFlow, FlowScope, FlowState};
use crate::runner::FlowRef;

/// What one runner step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionType {
    /// Ran one node of the front flow.
    NodeExecution,
    /// Handed a resume context to the paused node.
    NodeResume,
    /// Gave the paused node a tick.
    NodeTick,
    /// The front flow had no node left and finished.
    FlowFinish,
}

/// How the stepped flow came out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultState {
    Running,
    Pause,
    Abort,
    Failed,
}

/// One runner step, fed to the queue policy and the trigger gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub flow: FlowRef,
    pub kind: ExecutionType,
    pub state: ResultState,
}

pub(crate) fn execute_step(
    flow_ref: FlowRef,
    flow: &mut AbilityFlow,
    scope: &mut FlowScope<'_>,
) -> StepResult {
    if !flow.step_move_next() {
        flow.mark_done();
        return StepResult {
            flow: flow_ref,
            kind: ExecutionType::FlowFinish,
            state: ResultState::Running,
        };
    }
    let state = flow.step_run_current(scope);
    StepResult {
        flow: flow_ref,
        kind: ExecutionType::NodeExecution,
        state: map_state(state),
    }
}

pub(crate) fn resume_step(
    flow_ref: FlowRef,
    flow: &mut AbilityFlow,
    context: &dyn Any,
    scope: &mut FlowScope<'_>,
) -> StepResult {
    if !flow.check_resume(context) {
        return StepResult {
            flow: flow_ref,
            kind: ExecutionType::NodeResume,
            state: ResultState::Failed,
        };
    }
    let state = flow.step_resume(context, scope);
    StepResult {
        flow: flow_ref,
        kind: ExecutionType::NodeResume,
        state: map_state(state),
    }
}

pub(crate) fn tick_step(
    flow_ref: FlowRef,
    flow: &mut AbilityFlow,
    scope: &mut FlowScope<'_>,
) -> StepResult {
    let state = flow.step_tick(scope);
    StepResult {
        flow: flow_ref,
        kind: ExecutionType::NodeTick,
        state: map_state(state),
    }
}

fn map_state(state: FlowState) -> ResultState {
    match state {
        // A node handing back `Done` finishes the flow early but the
        // step itself succeeded.
        FlowState::Running | FlowState::Done => ResultState::Running,
        FlowState::Pause => ResultState::Pause,
        FlowState::Abort => ResultState::Abort,
        // No node may hand back `Clean`.
        FlowState::Clean => ResultState::Failed,
    }
}
