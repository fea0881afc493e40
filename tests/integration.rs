//! End-to-end scenarios: instanced abilities, player choices, custom
//! combat nodes and portable ability packs.
mod common;
use common::*;
use waza::prelude::*;

const POWER: i32 = 1;

/// Damage event raised once per struck target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hit {
    target: OwnerId,
    amount: i32,
}

/// Subtracts its `amount` from the power stat of every pulled target and
/// raises one [`Hit`] per target.
struct StrikeLogic;

impl NodeLogic for StrikeLogic {
    fn do_logic(&mut self, cx: &mut NodeContext<'_, '_>) -> FlowState {
        let targets = cx.input("targets").into_list();
        let amount = cx.variable("amount").into_int();
        for target in targets {
            if let Some(repo) = cx.owners_mut()
                && let Some(owner) = repo.owner_mut(target)
                && let Some(stat) = owner.stat_mut(POWER)
            {
                stat.base -= amount;
                stat.current -= amount;
            }
            cx.enqueue_event(payload(Hit { target, amount }));
        }
        FlowState::Running
    }
}

fn strike_node() -> NodeDescriptor {
    NodeDescriptor::process("strikeNode", || Box::new(StrikeLogic))
        .with_inport("targets", ValueKind::List)
        .with_variable("amount", ValueKind::Int)
}

/// Exposes the owners carried in the trigger payload as a target list.
struct PayloadTargetsLogic;

impl NodeLogic for PayloadTargetsLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let mut targets = Vec::new();
        if let Some(event) = cx.payload()
            && let Some(list) = event.downcast_ref::<Vec<OwnerId>>()
        {
            targets = list.clone();
        }
        out.set("targets", Value::List(targets));
    }
}

fn payload_targets_node() -> NodeDescriptor {
    NodeDescriptor::value("payloadTargetsNode", || Box::new(PayloadTargetsLogic))
        .with_outport("targets", ValueKind::List)
}

/// Exposes the flow's actor as an entity value.
struct ActorLogic;

impl NodeLogic for ActorLogic {
    fn evaluate(&self, cx: &mut ValueContext<'_>, out: &mut Outputs<'_>) {
        let Some(actor) = cx.actor() else {
            return;
        };
        out.set("entity", Value::Entity(actor));
    }
}

fn actor_node() -> NodeDescriptor {
    NodeDescriptor::value("actorNode", || Box::new(ActorLogic))
        .with_outport("entity", ValueKind::Entity)
}

fn combat_system(trace: &Trace) -> AbilitySystem {
    AbilitySystem::builder()
        .with_node(record_node(trace))
        .with_node(choice_node())
        .with_node(strike_node())
        .with_node(payload_targets_node())
        .with_node(actor_node())
        .with_stat_definitions(power_definitions())
        .build()
}

const BRANCH_POWER_GRAPH: &str = r#"{
    "nodes": [
        { "_id": 1, "_type": "startNode" },
        { "_id": 2, "_type": "ifNode" },
        { "_id": 3, "_type": "greaterNode" },
        { "_id": 4, "_type": "blackboardNode", "key": "power" },
        { "_id": 5, "_type": "integerNode", "value": 5 },
        { "_id": 6, "_type": "recordNode", "label": "strong" },
        { "_id": 7, "_type": "recordNode", "label": "weak" }
    ],
    "edges": [
        { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
        { "source": 3, "source_port": "result", "target": 2, "target_port": "condition" },
        { "source": 4, "source_port": "value", "target": 3, "target_port": "a" },
        { "source": 5, "source_port": "output", "target": 3, "target_port": "b" },
        { "source": 2, "source_port": "true", "target": 6, "target_port": "previous" },
        { "source": 2, "source_port": "false", "target": 7, "target_port": "previous" }
    ]
}"#;

#[test]
fn test_instances_of_one_pack_keep_their_own_variables() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let data = AbilityData::new("powercheck")
        .with_variable("power", 0)
        .with_graph(BRANCH_POWER_GRAPH);

    let strong = system.get_ability(&data);
    let weak = system.get_ability(&data);
    system.ability_mut(strong).unwrap().override_variable("power", 9);
    system.ability_mut(weak).unwrap().override_variable("power", 2);

    system.try_enqueue_ability(strong, None);
    system.try_enqueue_ability(weak, None);
    system.run().unwrap();

    assert_eq!(trace_entries(&trace), ["strong", "weak"]);
    assert_eq!(system.ability(strong).unwrap().variable("power"), 9);
    assert_eq!(system.ability(weak).unwrap().variable("power"), 2);
}

const CHOICE_BRANCH_GRAPH: &str = r#"{
    "nodes": [
        { "_id": 1, "_type": "startNode" },
        { "_id": 2, "_type": "recordNode", "label": "prompt" },
        { "_id": 3, "_type": "choiceNode" },
        { "_id": 4, "_type": "ifNode" },
        { "_id": 5, "_type": "equalNode" },
        { "_id": 6, "_type": "blackboardNode", "key": "chosen" },
        { "_id": 7, "_type": "integerNode", "value": 1 },
        { "_id": 8, "_type": "recordNode", "label": "confirmed" },
        { "_id": 9, "_type": "recordNode", "label": "cancelled" }
    ],
    "edges": [
        { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
        { "source": 2, "source_port": "next", "target": 3, "target_port": "previous" },
        { "source": 3, "source_port": "next", "target": 4, "target_port": "previous" },
        { "source": 5, "source_port": "result", "target": 4, "target_port": "condition" },
        { "source": 6, "source_port": "value", "target": 5, "target_port": "a" },
        { "source": 7, "source_port": "output", "target": 5, "target_port": "b" },
        { "source": 4, "source_port": "true", "target": 8, "target_port": "previous" },
        { "source": 4, "source_port": "false", "target": 9, "target_port": "previous" }
    ]
}"#;

#[test]
fn test_player_choice_pauses_the_turn_and_branches_on_the_answer() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let handle = system.get_ability(&AbilityData::new("confirm").with_graph(CHOICE_BRANCH_GRAPH));

    system.try_enqueue_ability(handle, None);
    system.run().unwrap();
    assert_eq!(system.running_state(), RunningState::Pause);
    system.resume(&ChoiceContext { index: 1 }).unwrap();
    assert_eq!(trace_entries(&trace), ["prompt", "confirmed"]);

    // The same instance can be cast again; the reset drops the old answer.
    system.try_enqueue_ability(handle, None);
    system.run().unwrap();
    system.resume(&ChoiceContext { index: 2 }).unwrap();
    assert_eq!(
        trace_entries(&trace),
        ["prompt", "confirmed", "prompt", "cancelled"]
    );
}

const STRIKE_GRAPH: &str = r#"{
    "nodes": [
        { "_id": 1, "_type": "startNode" },
        { "_id": 2, "_type": "strikeNode", "amount": 4 },
        { "_id": 3, "_type": "payloadTargetsNode" }
    ],
    "edges": [
        { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
        { "source": 3, "source_port": "targets", "target": 2, "target_port": "targets" }
    ]
}"#;

#[test]
fn test_custom_strike_damages_every_payload_target() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let first = system.create_owner();
    let second = system.create_owner();
    system.add_stat(first, POWER, 10);
    system.add_stat(second, POWER, 8);

    let handle = system.get_ability(&AbilityData::new("cleave").with_graph(STRIKE_GRAPH));
    let events = system.subscribe_events();

    assert!(system.try_enqueue_ability(handle, Some(payload(vec![first, second]))));
    system.run().unwrap();

    assert_eq!(system.owner(first).unwrap().stat(POWER).unwrap().base, 6);
    assert_eq!(system.owner(first).unwrap().stat(POWER).unwrap().current, 6);
    assert_eq!(system.owner(second).unwrap().stat(POWER).unwrap().base, 4);

    let hit = events.try_recv().unwrap();
    assert_eq!(
        *hit.downcast_ref::<Hit>().unwrap(),
        Hit { target: first, amount: 4 }
    );
    let hit = events.try_recv().unwrap();
    assert_eq!(
        *hit.downcast_ref::<Hit>().unwrap(),
        Hit { target: second, amount: 4 }
    );
    assert!(events.try_recv().is_err());
}

const SELF_STRIKE_GRAPH: &str = r#"{
    "nodes": [
        { "_id": 1, "_type": "startNode" },
        { "_id": 2, "_type": "strikeNode", "amount": 3 },
        { "_id": 3, "_type": "actorNode" }
    ],
    "edges": [
        { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
        { "source": 3, "source_port": "entity", "target": 2, "target_port": "targets" }
    ]
}"#;

#[test]
fn test_entity_output_feeds_a_list_input_through_the_converter() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let hero = system.create_owner();
    system.add_stat(hero, POWER, 10);

    let handle = system.get_ability(&AbilityData::new("recoil").with_graph(SELF_STRIKE_GRAPH));
    system.ability_mut(handle).unwrap().set_actor(Some(hero));

    system.try_enqueue_ability(handle, None);
    system.run().unwrap();

    assert_eq!(system.owner(hero).unwrap().stat(POWER).unwrap().base, 7);
}

#[test]
fn test_pack_survives_the_disk_round_trip() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let graph = r#"{
        "nodes": [
            { "_id": 1, "_type": "startNode" },
            { "_id": 2, "_type": "recordNode", "label": "loaded" }
        ],
        "edges": [
            { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" }
        ]
    }"#;
    let data = AbilityData::new("portable")
        .with_variable("power", 7)
        .with_graph(graph);

    let path = std::env::temp_dir().join("waza-integration-pack.bin");
    let path = path.to_str().unwrap();
    data.save(path).unwrap();
    let loaded = AbilityData::from_file(path).unwrap();
    assert_eq!(loaded.name(), "portable");

    let handle = system.get_ability(&loaded);
    assert_eq!(system.ability(handle).unwrap().variable("power"), 7);
    system.try_enqueue_ability(handle, None);
    system.run().unwrap();
    assert_eq!(trace_entries(&trace), ["loaded"]);
}

#[test]
fn test_events_fan_out_to_every_subscriber() {
    let trace = new_trace();
    let mut system = combat_system(&trace);
    let first = system.subscribe_events();
    let second = system.subscribe_events();

    system.publish_event(payload("turn-ended".to_string()));
    system.trigger_cached_events();

    for subscriber in [&first, &second] {
        let event = subscriber.try_recv().unwrap();
        assert_eq!(event.downcast_ref::<String>().unwrap(), "turn-ended");
        assert!(subscriber.try_recv().is_err());
    }
}

#[test]
fn test_user_data_keeps_embedder_state_per_instance() {
    struct Cooldown {
        remaining: i32,
    }

    let trace = new_trace();
    let mut system = combat_system(&trace);
    let handle = system.get_ability(&AbilityData::new("tracked"));

    system
        .ability_mut(handle)
        .unwrap()
        .set_user_data(Cooldown { remaining: 3 });
    let ability = system.ability(handle).unwrap();
    assert_eq!(ability.user_data::<Cooldown>().unwrap().remaining, 3);
    assert!(ability.user_data::<String>().is_none());

    // Setting again replaces the previous value.
    system
        .ability_mut(handle)
        .unwrap()
        .set_user_data(Cooldown { remaining: 1 });
    let ability = system.ability(handle).unwrap();
    assert_eq!(ability.user_data::<Cooldown>().unwrap().remaining, 1);
}
