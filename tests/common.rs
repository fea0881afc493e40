//! Common test utilities: game-flavored test nodes and a log capture layer.
use std::any::Any;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use waza::prelude::*;

/// Shared execution trace the test nodes append to.
pub type Trace = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn new_trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

#[allow(dead_code)]
pub fn trace_entries(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

/// Process node that appends its configured label to the trace.
struct RecordLogic {
    trace: Trace,
}

impl NodeLogic for RecordLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let label = cx.variable("label").into_string();
        self.trace.lock().unwrap().push(label);
        FlowState::Running
    }
}

/// Descriptor for `recordNode`, bound to the given trace.
#[allow(dead_code)]
pub fn record_node(trace: &Trace) -> NodeDescriptor {
    let trace = trace.clone();
    NodeDescriptor::process("recordNode", move || {
        Box::new(RecordLogic {
            trace: trace.clone(),
        })
    })
    .with_variable("label", ValueKind::String)
}

/// Resume context the `choiceNode` waits for.
pub struct ChoiceContext {
    pub index: i32,
}

/// Pauses until a [`ChoiceContext`] arrives, then stores the chosen index
/// under the `chosen` variable.
struct ChoiceLogic;

impl NodeLogic for ChoiceLogic {
    fn do_logic(&mut self, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        FlowState::Pause
    }

    fn accepts_resume(&self, context: &dyn Any) -> bool {
        context.downcast_ref::<ChoiceContext>().is_some()
    }

    fn resume(&mut self, context: &dyn Any, cx: &mut NodeContext<'_, '_>) -> FlowState {
        if let Some(choice) = context.downcast_ref::<ChoiceContext>() {
            cx.write_variable("chosen", choice.index);
        }
        FlowState::Running
    }
}

#[allow(dead_code)]
pub fn choice_node() -> NodeDescriptor {
    NodeDescriptor::process("choiceNode", || Box::new(ChoiceLogic))
}

/// Entry that only starts for a `String` payload saying "go".
struct GateLogic;

impl NodeLogic for GateLogic {
    fn can_execute(&self, payload: Option<&EventPayload>) -> bool {
        payload.is_some_and(|p| p.downcast_ref::<String>().is_some_and(|s| s == "go"))
    }
}

#[allow(dead_code)]
pub fn gate_node() -> NodeDescriptor {
    NodeDescriptor::entry("gateNode", || Box::new(GateLogic))
}

/// Attaches an additive modifier to the actor's stat.
struct BuffLogic;

impl NodeLogic for BuffLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let stat = cx.variable("stat").into_int();
        let amount = cx.variable("amount").into_int();
        let Some(actor) = cx.actor() else {
            return FlowState::Running;
        };
        if let Some(repo) = cx.owners_mut()
            && let Some(owner) = repo.owner_mut(actor)
        {
            owner.add_modifier(StatModifier::new().with(StatModifierItem::add(stat, amount)));
        }
        FlowState::Running
    }
}

#[allow(dead_code)]
pub fn buff_node() -> NodeDescriptor {
    NodeDescriptor::process("buffNode", || Box::new(BuffLogic))
        .with_variable("stat", ValueKind::Int)
        .with_variable("amount", ValueKind::Int)
}

/// Reads the actor's current stat value into the `seen` variable.
struct ReadStatLogic;

impl NodeLogic for ReadStatLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let stat = cx.variable("stat").into_int();
        let Some(actor) = cx.actor() else {
            return FlowState::Running;
        };
        let mut seen = -1;
        if let Some(repo) = cx.owners_mut()
            && let Some(owner) = repo.owner(actor)
            && let Some(entry) = owner.stat(stat)
        {
            seen = entry.current;
        }
        cx.write_variable("seen", seen);
        FlowState::Running
    }
}

#[allow(dead_code)]
pub fn read_stat_node() -> NodeDescriptor {
    NodeDescriptor::process("readStatNode", || Box::new(ReadStatLogic))
        .with_variable("stat", ValueKind::Int)
}

/// Node whose execution is broken on purpose: it hands back `Clean`,
/// which no well-behaved node may do.
struct BrokenLogic;

impl NodeLogic for BrokenLogic {
    fn do_logic(&mut self, _cx: &mut NodeContext<'_, '_>) -> FlowState {
        FlowState::Clean
    }
}

#[allow(dead_code)]
pub fn broken_node() -> NodeDescriptor {
    NodeDescriptor::process("brokenNode", || Box::new(BrokenLogic))
}

/// Stat definitions shared by the stat-flavored tests.
#[allow(dead_code)]
pub fn power_definitions() -> Vec<StatDefinition> {
    vec![
        StatDefinition::new(1, "power"),
        StatDefinition::new(2, "speed"),
    ]
}

/// Loads a graph JSON against the given registry, panicking on parse errors.
#[allow(dead_code)]
pub fn load_graph(registry: &NodeRegistry, json: &str) -> AbilityGraph {
    deserialize_graph(json, registry).unwrap()
}

/// Builds a standalone flow from a graph JSON and the default registry.
#[allow(dead_code)]
pub fn flow_from(json: &str) -> AbilityFlow {
    let registry = NodeRegistry::with_defaults();
    AbilityFlow::new(load_graph(&registry, json))
}

/// Collects every log event emitted inside a closure, by level.
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<(tracing::Level, String)>>>,
}

#[allow(dead_code)]
impl LogCapture {
    pub fn error_count(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, _)| *level == tracing::Level::ERROR)
            .count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            use std::fmt::Write;
            let _ = write!(self.0, "{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _cx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.records
            .lock()
            .unwrap()
            .push((*event.metadata().level(), message));
    }
}

/// Runs a closure with log capture installed and returns its result plus
/// the captured records.
#[allow(dead_code)]
pub fn with_log_capture<T>(f: impl FnOnce() -> T) -> (T, LogCapture) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture)
}
