//! The embedding facade: one object owning the registry, the stat
//! repository, the event buffer, all ability instances and the runner.

use std::any::Any;
use std::fmt;

use ahash::AHashMap;
use tracing::{debug, error, warn};

use crate::ability::Ability;
use crate::data::{AbilityData, NodeRegistry};
use crate::error::RunnerError;
use crate::event::{EventPayload, EventQueue};
use crate::flow::{FlowScope, FlowState};
use crate::graph::{ConvertFn, NodeDescriptor, ValueKind};
use crate::runner::stepper;
use crate::runner::{
    EventTriggerMode, ExecutionType, FifoFlowQueue, FlowQueue, FlowRef, FlowRunner, ResultState,
    RunningState, StepResult,
};
use crate::stats::{OwnerId, StatDefinition, StatDefinitionTable, StatOwner, StatOwnerRepository};

/// Handle to one ability instance inside a system.
///
/// Handles are never reused; a released handle simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbilityHandle(u64);

impl fmt::Display for AbilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

/// Configures an [`AbilitySystem`] before it exists.
///
/// Starts from the built-in node set, the default converter table, an
/// empty stat table, FIFO scheduling and the `EachNode` trigger mode;
/// every `with_*` call swaps one of those out.
pub struct AbilitySystemBuilder {
    registry: NodeRegistry,
    stat_definitions: Vec<StatDefinition>,
    trigger_mode: EventTriggerMode,
    queue: Option<Box<dyn FlowQueue>>,
}

impl AbilitySystemBuilder {
    fn new() -> Self {
        Self {
            registry: NodeRegistry::with_defaults(),
            stat_definitions: Vec::new(),
            trigger_mode: EventTriggerMode::default(),
            queue: None,
        }
    }

    /// Declares the stats this system knows about.
    pub fn with_stat_definitions(mut self, definitions: Vec<StatDefinition>) -> Self {
        self.stat_definitions = definitions;
        self
    }

    /// Adds (or overrides) one node type.
    pub fn with_node(mut self, descriptor: NodeDescriptor) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// Adds (or overrides) one value conversion.
    pub fn with_converter(mut self, from: ValueKind, to: ValueKind, convert: ConvertFn) -> Self {
        self.registry.converters_mut().register(from, to, convert);
        self
    }

    pub fn with_trigger_mode(mut self, mode: EventTriggerMode) -> Self {
        self.trigger_mode = mode;
        self
    }

    /// Replaces the FIFO queue with a custom scheduling discipline.
    pub fn with_queue(mut self, queue: Box<dyn FlowQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn build(self) -> AbilitySystem {
        let table = match StatDefinitionTable::build(self.stat_definitions) {
            Some(table) => table,
            None => {
                warn!("stat definitions were rejected, starting with an empty table");
                StatDefinitionTable::default()
            }
        };
        let queue = self
            .queue
            .unwrap_or_else(|| Box::new(FifoFlowQueue::default()));
        AbilitySystem {
            registry: self.registry,
            owners: StatOwnerRepository::new(table),
            runner: FlowRunner::new(queue, self.trigger_mode),
            abilities: AHashMap::new(),
            next_handle: 0,
            events: EventQueue::new(),
        }
    }
}

/// The top-level engine object.
///
/// One system per game world: it instantiates abilities from their data
/// packs, queues their flows, drives the runner loop and owns the stat
/// and event state those flows touch. Everything here is synchronous;
/// `run`, `resume` and `tick` return once the queue parks or drains.
pub struct AbilitySystem {
    registry: NodeRegistry,
    owners: StatOwnerRepository,
    runner: FlowRunner,
    abilities: AHashMap<AbilityHandle, Ability>,
    next_handle: u64,
    events: EventQueue,
}

impl AbilitySystem {
    pub fn builder() -> AbilitySystemBuilder {
        AbilitySystemBuilder::new()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn owners(&self) -> &StatOwnerRepository {
        &self.owners
    }

    pub fn owners_mut(&mut self) -> &mut StatOwnerRepository {
        &mut self.owners
    }

    pub fn create_owner(&mut self) -> OwnerId {
        self.owners.create_owner()
    }

    pub fn remove_owner(&mut self, id: OwnerId) {
        self.owners.remove_owner(id);
    }

    pub fn owner(&self, id: OwnerId) -> Option<&StatOwner> {
        self.owners.owner(id)
    }

    pub fn owner_mut(&mut self, id: OwnerId) -> Option<&mut StatOwner> {
        self.owners.owner_mut(id)
    }

    pub fn add_stat(&mut self, owner: OwnerId, stat_id: i32, base: i32) {
        self.owners.add_stat(owner, stat_id, base);
    }

    /// Recomputes every owner's current stats from base plus modifiers.
    pub fn refresh_stats_and_modifiers(&mut self) {
        self.owners.refresh_all();
    }

    /// Instantiates an ability from its data pack and keeps it under a
    /// fresh handle.
    pub fn get_ability(&mut self, data: &AbilityData) -> AbilityHandle {
        let ability = Ability::instantiate(data, &self.registry);
        let handle = AbilityHandle(self.next_handle);
        self.next_handle += 1;
        self.abilities.insert(handle, ability);
        handle
    }

    /// Drops an ability instance. Flows of it still sitting in the queue
    /// are skipped when their turn comes.
    pub fn release_ability(&mut self, handle: AbilityHandle) {
        if self.abilities.remove(&handle).is_none() {
            warn!(%handle, "release_ability: unknown handle");
        }
    }

    pub fn ability(&self, handle: AbilityHandle) -> Option<&Ability> {
        let found = self.abilities.get(&handle);
        if found.is_none() {
            warn!(%handle, "unknown ability handle");
        }
        found
    }

    pub fn ability_mut(&mut self, handle: AbilityHandle) -> Option<&mut Ability> {
        let found = self.abilities.get_mut(&handle);
        if found.is_none() {
            warn!(%handle, "unknown ability handle");
        }
        found
    }

    /// Queues every eligible flow of the ability: enabled, not already in
    /// flight, and with an entry node that accepts the payload. Each
    /// queued flow is reset and gets its own clone of the payload handle.
    /// Returns whether anything was queued.
    pub fn try_enqueue_ability(
        &mut self,
        handle: AbilityHandle,
        payload: Option<EventPayload>,
    ) -> bool {
        let Some(ability) = self.abilities.get_mut(&handle) else {
            error!(%handle, "try_enqueue_ability: unknown handle");
            return false;
        };
        let mut enqueued = false;
        for index in 0..ability.flow_count() {
            if !ability.is_enabled(index) {
                continue;
            }
            let Some(flow) = ability.flow_mut(index) else {
                continue;
            };
            match flow.current_state() {
                FlowState::Running | FlowState::Pause => {
                    warn!(%handle, flow = index, "flow is still in flight, not queued");
                    continue;
                }
                FlowState::Clean | FlowState::Abort | FlowState::Done => {}
            }
            if !flow.can_accept(payload.as_ref()) {
                debug!(%handle, flow = index, "entry node refused the payload");
                continue;
            }
            flow.reset();
            flow.set_payload(payload.clone());
            self.runner.enqueue(FlowRef {
                ability: handle,
                flow: index,
            });
            enqueued = true;
        }
        enqueued
    }

    /// Drives the queue until it drains, a flow pauses or a step fails.
    /// Calling this while parked behind a paused flow is reported and
    /// does nothing; resume or tick first.
    pub fn run(&mut self) -> Result<(), RunnerError> {
        if self.runner.running_state() != RunningState::Idle {
            error!("run while a flow is paused, resume or tick it first");
            return Ok(());
        }
        self.step_loop()
    }

    /// Offers a resume context to the paused front flow. The context must
    /// be accepted by the waiting node; a rejected context errors and the
    /// flow stays paused, so a corrected resume can follow.
    pub fn resume(&mut self, context: &dyn Any) -> Result<(), RunnerError> {
        if self.runner.running_state() != RunningState::Pause {
            error!("resume while nothing is paused");
            return Ok(());
        }
        let Some(flow_ref) = self.runner.peek() else {
            error!("runner is parked but the queue is empty");
            self.runner.force_idle();
            return Ok(());
        };
        let Some(result) = self.do_resume_step(flow_ref, context) else {
            warn!(%flow_ref.ability, flow = flow_ref.flow, "paused flow no longer exists, dropped");
            self.runner.dequeue();
            self.runner.force_idle();
            return Ok(());
        };
        let keep = self.runner.apply(&result);
        self.maybe_trigger(&result);
        if result.state == ResultState::Failed {
            return Err(RunnerError::ResumeRejected);
        }
        if keep {
            self.step_loop()
        } else {
            Ok(())
        }
    }

    /// Gives the paused front flow one tick, then keeps running if the
    /// tick released it.
    pub fn tick(&mut self) -> Result<(), RunnerError> {
        if self.runner.running_state() != RunningState::Pause {
            error!("tick while nothing is paused");
            return Ok(());
        }
        let Some(flow_ref) = self.runner.peek() else {
            error!("runner is parked but the queue is empty");
            self.runner.force_idle();
            return Ok(());
        };
        let Some(result) = self.do_tick_step(flow_ref) else {
            warn!(%flow_ref.ability, flow = flow_ref.flow, "paused flow no longer exists, dropped");
            self.runner.dequeue();
            self.runner.force_idle();
            return Ok(());
        };
        let keep = self.runner.apply(&result);
        self.maybe_trigger(&result);
        if result.state == ResultState::Failed {
            return Err(RunnerError::StepFailed(format!(
                "{} flow {} failed during a tick",
                flow_ref.ability, flow_ref.flow
            )));
        }
        if keep {
            self.step_loop()
        } else {
            Ok(())
        }
    }

    /// Buffers an event as if a node had raised it.
    pub fn publish_event(&mut self, event: EventPayload) {
        self.events.enqueue(event);
    }

    /// Flushes the event buffer to all subscribers now, regardless of the
    /// trigger mode.
    pub fn trigger_cached_events(&mut self) {
        self.events.flush();
    }

    pub fn subscribe_events(&mut self) -> flume::Receiver<EventPayload> {
        self.events.subscribe()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn running_state(&self) -> RunningState {
        self.runner.running_state()
    }

    pub fn trigger_mode(&self) -> EventTriggerMode {
        self.runner.trigger_mode()
    }

    pub fn queued_flows(&self) -> usize {
        self.runner.len()
    }

    /// Throws away everything still queued and unparks the runner.
    pub fn clear_queue(&mut self) {
        self.runner.clear();
    }

    fn step_loop(&mut self) -> Result<(), RunnerError> {
        while let Some(flow_ref) = self.runner.peek() {
            let Some(result) = self.do_execute_step(flow_ref) else {
                warn!(%flow_ref.ability, flow = flow_ref.flow, "queued flow no longer exists, dropped");
                self.runner.dequeue();
                continue;
            };
            let keep = self.runner.apply(&result);
            self.maybe_trigger(&result);
            if result.state == ResultState::Failed {
                return Err(RunnerError::StepFailed(format!(
                    "{} flow {} failed on node execution",
                    flow_ref.ability, flow_ref.flow
                )));
            }
            if !keep {
                break;
            }
        }
        Ok(())
    }

    /// Flushes events and refreshes stats at the points the trigger mode
    /// selects. Ticks never trigger on their own.
    fn maybe_trigger(&mut self, result: &StepResult) {
        let fire = match self.runner.trigger_mode() {
            EventTriggerMode::EachNode => matches!(
                result.kind,
                ExecutionType::NodeExecution | ExecutionType::NodeResume
            ),
            EventTriggerMode::EachFlow => result.kind == ExecutionType::FlowFinish,
            EventTriggerMode::Never => false,
        };
        if fire {
            self.trigger_cached_events();
            self.refresh_stats_and_modifiers();
        }
    }

    fn do_execute_step(&mut self, flow_ref: FlowRef) -> Option<StepResult> {
        let Self {
            abilities,
            owners,
            events,
            ..
        } = self;
        let ability = abilities.get_mut(&flow_ref.ability)?;
        let (flow, vars) = ability.flow_and_vars(flow_ref.flow)?;
        let mut scope = FlowScope {
            owners: Some(owners),
            events: Some(events),
            ability_vars: Some(vars),
        };
        Some(stepper::execute_step(flow_ref, flow, &mut scope))
    }

    fn do_resume_step(&mut self, flow_ref: FlowRef, context: &dyn Any) -> Option<StepResult> {
        let Self {
            abilities,
            owners,
            events,
            ..
        } = self;
        let ability = abilities.get_mut(&flow_ref.ability)?;
        let (flow, vars) = ability.flow_and_vars(flow_ref.flow)?;
        let mut scope = FlowScope {
            owners: Some(owners),
            events: Some(events),
            ability_vars: Some(vars),
        };
        Some(stepper::resume_step(flow_ref, flow, context, &mut scope))
    }

    fn do_tick_step(&mut self, flow_ref: FlowRef) -> Option<StepResult> {
        let Self {
            abilities,
            owners,
            events,
            ..
        } = self;
        let ability = abilities.get_mut(&flow_ref.ability)?;
        let (flow, vars) = ability.flow_and_vars(flow_ref.flow)?;
        let mut scope = FlowScope {
            owners: Some(owners),
            events: Some(events),
            ability_vars: Some(vars),
        };
        Some(stepper::tick_step(flow_ref, flow, &mut scope))
    }
}
