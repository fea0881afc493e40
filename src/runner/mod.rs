//! Turn-based scheduling: the flow queue and its step policy.

pub mod stepper;

pub use stepper::{ExecutionType, ResultState, StepResult};

use std::collections::VecDeque;

use crate::system::AbilityHandle;

/// Address of one flow inside one ability instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowRef {
    pub ability: AbilityHandle,
    pub flow: usize,
}

/// Whether the runner may advance or is parked behind a paused flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningState {
    #[default]
    Idle,
    Pause,
}

/// When the system flushes buffered events and refreshes stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTriggerMode {
    /// After every executed or resumed node.
    #[default]
    EachNode,
    /// Only when a flow finishes.
    EachFlow,
    /// Never on its own; the embedder flushes by hand.
    Never,
}

/// Queue discipline for flows waiting to run.
///
/// The default is plain FIFO; a custom implementation can reorder by
/// priority or interleave abilities, as long as `peek` and `dequeue`
/// agree on the front element.
pub trait FlowQueue: Send {
    fn enqueue(&mut self, flow: FlowRef);
    fn dequeue(&mut self) -> Option<FlowRef>;
    fn peek(&self) -> Option<FlowRef>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct FifoFlowQueue {
    flows: VecDeque<FlowRef>,
}

impl FlowQueue for FifoFlowQueue {
    fn enqueue(&mut self, flow: FlowRef) {
        self.flows.push_back(flow);
    }

    fn dequeue(&mut self) -> Option<FlowRef> {
        self.flows.pop_front()
    }

    fn peek(&self) -> Option<FlowRef> {
        self.flows.front().copied()
    }

    fn clear(&mut self) {
        self.flows.clear();
    }

    fn len(&self) -> usize {
        self.flows.len()
    }
}

/// Applies step outcomes to the queue.
///
/// The policy is fixed: a finished or aborted flow is dequeued and the
/// loop continues, a paused flow parks the runner and stays at the
/// front, a failed step leaves everything in place for the caller to
/// surface.
pub struct FlowRunner {
    queue: Box<dyn FlowQueue>,
    state: RunningState,
    mode: EventTriggerMode,
}

impl FlowRunner {
    pub(crate) fn new(queue: Box<dyn FlowQueue>, mode: EventTriggerMode) -> Self {
        Self {
            queue,
            state: RunningState::Idle,
            mode,
        }
    }

    /// Folds one step result into queue and runner state. Returns whether
    /// the loop may keep going.
    pub(crate) fn apply(&mut self, result: &StepResult) -> bool {
        match result.state {
            ResultState::Failed => false,
            ResultState::Abort => {
                self.queue.dequeue();
                self.state = RunningState::Idle;
                true
            }
            ResultState::Pause => {
                self.state = RunningState::Pause;
                false
            }
            ResultState::Running => {
                if result.kind == ExecutionType::FlowFinish {
                    self.queue.dequeue();
                }
                self.state = RunningState::Idle;
                true
            }
        }
    }

    pub(crate) fn enqueue(&mut self, flow: FlowRef) {
        self.queue.enqueue(flow);
    }

    pub(crate) fn dequeue(&mut self) -> Option<FlowRef> {
        self.queue.dequeue()
    }

    pub(crate) fn peek(&self) -> Option<FlowRef> {
        self.queue.peek()
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.state = RunningState::Idle;
    }

    /// Unparks the runner after the paused flow went away.
    pub(crate) fn force_idle(&mut self) {
        self.state = RunningState::Idle;
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn running_state(&self) -> RunningState {
        self.state
    }

    pub fn trigger_mode(&self) -> EventTriggerMode {
        self.mode
    }
}
