//! Tests for the graph JSON codec and the binary ability packs: full
//! round-trips and the degrade-locally policy for defective documents.
mod common;
use common::*;
use waza::data::Position;
use waza::prelude::*;

/// Inert process node declaring one variable of every kind, so a single
/// document exercises every field codec path.
struct FixtureLogic;

impl NodeLogic for FixtureLogic {}

fn fixture_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::with_defaults();
    registry.register(
        NodeDescriptor::process("fixtureNode", || Box::new(FixtureLogic))
            .with_variable("flag", ValueKind::Bool)
            .with_variable("count", ValueKind::Int)
            .with_variable("label", ValueKind::String)
            .with_variable("target", ValueKind::Entity)
            .with_variable("squad", ValueKind::List),
    );
    registry
}

const FIXTURE_GRAPH: &str = r#"{
    "blackboard": [ { "key": "mana", "value": 3 } ],
    "nodes": [
        { "_id": 1, "_position": { "x": 0.0, "y": 0.0 }, "_type": "startNode" },
        { "_id": 2, "_position": { "x": 180.0, "y": 0.0 }, "_type": "logNode" },
        { "_id": 3, "_position": { "x": 40.0, "y": 120.0 }, "_type": "stringNode", "text": "cast!" },
        { "_id": 4, "_position": { "x": 360.0, "y": 0.0 }, "_type": "fixtureNode",
          "flag": true, "count": 3, "label": "hi", "target": 77, "squad": [5, 6] }
    ],
    "edges": [
        { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
        { "source": 3, "source_port": "output", "target": 2, "target_port": "text" },
        { "source": 2, "source_port": "next", "target": 4, "target_port": "previous" }
    ]
}"#;

#[test]
fn test_deserialize_reads_nodes_variables_and_blackboard() {
    let registry = fixture_registry();
    let graph = load_graph(&registry, FIXTURE_GRAPH);

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.blackboard(), &[BlackboardVariable::new("mana", 3)]);

    let fixture = graph.node(graph.node_index_by_id(4).unwrap()).unwrap();
    assert_eq!(fixture.variable("flag").unwrap().value(), &Value::Bool(true));
    assert_eq!(fixture.variable("count").unwrap().value(), &Value::Int(3));
    assert_eq!(
        fixture.variable("label").unwrap().value(),
        &Value::String("hi".to_string())
    );
    assert_eq!(
        fixture.variable("target").unwrap().value(),
        &Value::Entity(OwnerId(77))
    );
    assert_eq!(
        fixture.variable("squad").unwrap().value(),
        &Value::List(vec![OwnerId(5), OwnerId(6)])
    );

    let start = graph.node(graph.node_index_by_id(1).unwrap()).unwrap();
    assert!(start.outports()[0].is_connected());
}

#[test]
fn test_serialize_then_deserialize_is_stable() {
    let registry = fixture_registry();
    let first = load_graph(&registry, FIXTURE_GRAPH);
    let json_a = serialize_graph(&first).unwrap();
    let second = load_graph(&registry, &json_a);
    let json_b = serialize_graph(&second).unwrap();

    let doc_a: serde_json::Value = serde_json::from_str(&json_a).unwrap();
    let doc_b: serde_json::Value = serde_json::from_str(&json_b).unwrap();
    assert_eq!(doc_a, doc_b);

    assert_eq!(second.node_count(), first.node_count());
    assert_eq!(doc_a["blackboard"][0]["key"], "mana");
    assert_eq!(doc_a["edges"].as_array().unwrap().len(), 3);
}

#[test]
fn test_unknown_node_type_becomes_a_placeholder() {
    let json = r#"{
        "nodes": [
            { "_id": 1, "_type": "startNode" },
            { "_id": 2, "_type": "mysteryNode", "secret": 7 },
            { "_id": 3, "_type": "logNode" },
            { "_id": 4, "_type": "stringNode", "text": "still here" }
        ],
        "edges": [
            { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
            { "source": 2, "source_port": "next", "target": 3, "target_port": "previous" },
            { "source": 4, "source_port": "output", "target": 3, "target_port": "text" }
        ]
    }"#;
    let registry = NodeRegistry::with_defaults();
    let (graph, capture) = with_log_capture(|| load_graph(&registry, json));
    assert_eq!(capture.error_count(), 1);

    // The placeholder keeps its identity but takes no edges.
    let index = graph.node_index_by_id(2).unwrap();
    let placeholder = graph.node(index).unwrap();
    assert!(placeholder.is_undefined());
    assert_eq!(placeholder.type_name(), "mysteryNode");
    assert!(placeholder.inports().is_empty());

    let start = graph.node(graph.node_index_by_id(1).unwrap()).unwrap();
    assert!(!start.outports()[0].is_connected());
    let log = graph.node(graph.node_index_by_id(3).unwrap()).unwrap();
    let text = log.inport_index("text").unwrap();
    assert!(log.inports()[text].is_connected());

    // Re-serializing keeps the placeholder's identity and drops the
    // fields nobody could type-check.
    let json = serialize_graph(&graph).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    let nodes = doc["nodes"].as_array().unwrap();
    let entry = nodes.iter().find(|n| n["_id"] == 2).unwrap();
    assert_eq!(entry["_type"], "mysteryNode");
    assert_eq!(entry.as_object().unwrap().len(), 3);
    assert_eq!(doc["edges"].as_array().unwrap().len(), 1);
}

#[test]
fn test_wrong_typed_field_keeps_the_declared_default() {
    let json = r#"{ "nodes": [ { "_id": 1, "_type": "integerNode", "value": "oops" } ] }"#;
    let registry = NodeRegistry::with_defaults();
    let (graph, capture) = with_log_capture(|| load_graph(&registry, json));

    assert_eq!(capture.error_count(), 1);
    let node = graph.node(0).unwrap();
    assert!(!node.is_undefined());
    assert_eq!(node.variable("value").unwrap().value(), &Value::Int(0));
}

#[test]
fn test_unknown_field_is_skipped() {
    let json = r#"{ "nodes": [ { "_id": 1, "_type": "logNode", "mystery_field": 3 } ] }"#;
    let registry = NodeRegistry::with_defaults();
    let (graph, capture) = with_log_capture(|| load_graph(&registry, json));

    assert_eq!(capture.error_count(), 0);
    assert!(!graph.node(0).unwrap().is_undefined());
}

#[test]
fn test_missing_optional_fields_read_as_defaults() {
    let json = r#"{ "nodes": [ { "_type": "stringNode" } ] }"#;
    let registry = NodeRegistry::with_defaults();
    let graph = load_graph(&registry, json);

    let node = graph.node(0).unwrap();
    assert_eq!(node.id(), 0);
    assert_eq!(node.position(), Position::default());
    assert_eq!(
        node.variable("text").unwrap().value(),
        &Value::String(String::new())
    );

    let empty = load_graph(&registry, "{}");
    assert_eq!(empty.node_count(), 0);
    assert!(empty.blackboard().is_empty());
}

#[test]
fn test_defective_edges_are_dropped_and_the_rest_load() {
    let json = r#"{
        "nodes": [
            { "_id": 1, "_type": "startNode" },
            { "_id": 2, "_type": "logNode" }
        ],
        "edges": [
            { "source": 99, "source_port": "next", "target": 2, "target_port": "previous" },
            { "source": 1, "source_port": "next", "target": 2, "target_port": "no_such_port" },
            { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" }
        ]
    }"#;
    let registry = NodeRegistry::with_defaults();
    let (graph, capture) = with_log_capture(|| load_graph(&registry, json));

    assert_eq!(capture.error_count(), 2);
    let start = graph.node(graph.node_index_by_id(1).unwrap()).unwrap();
    assert_eq!(start.outports()[0].connections().len(), 1);
}

#[test]
fn test_duplicate_node_ids_resolve_to_the_first() {
    let json = r#"{
        "nodes": [
            { "_id": 7, "_type": "integerNode", "value": 1 },
            { "_id": 7, "_type": "integerNode", "value": 2 },
            { "_id": 8, "_type": "addNode" }
        ],
        "edges": [
            { "source": 7, "source_port": "output", "target": 8, "target_port": "a" }
        ]
    }"#;
    let registry = NodeRegistry::with_defaults();
    let graph = load_graph(&registry, json);

    assert_eq!(graph.node_index_by_id(7), Some(0));
    let output = graph.node(0).unwrap().outport_index("output").unwrap();
    assert!(graph.node(0).unwrap().outports()[output].is_connected());
    assert!(!graph.node(1).unwrap().outports()[output].is_connected());
}

#[test]
fn test_dynamic_ports_are_runtime_only() {
    let json = r#"{
        "nodes": [
            { "_id": 1, "_type": "startNode" },
            { "_id": 2, "_type": "logNode" }
        ],
        "edges": [
            { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" }
        ]
    }"#;
    let registry = NodeRegistry::with_defaults();
    let mut graph = load_graph(&registry, json);

    let start = graph.node_index_by_id(1).unwrap();
    let log = graph.node_index_by_id(2).unwrap();
    assert!(graph.node_mut(start).unwrap().add_dynamic_outport("boost", ValueKind::Int));
    assert!(graph.node_mut(log).unwrap().add_dynamic_inport("boost_in", ValueKind::Int));
    assert!(graph.connect(start, "boost", log, "boost_in"));

    let json = serialize_graph(&graph).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(doc["edges"].as_array().unwrap().len(), 1);

    let reloaded = load_graph(&registry, &json);
    let log = reloaded.node(reloaded.node_index_by_id(2).unwrap()).unwrap();
    assert!(log.inport_index("boost_in").is_none());
}

#[test]
fn test_malformed_json_is_the_only_hard_failure() {
    let registry = NodeRegistry::with_defaults();
    let result = deserialize_graph("{ this is not json", &registry);
    assert!(matches!(result, Err(CodecError::JsonParseError(_))));
}

#[test]
fn test_ability_data_byte_round_trip() {
    let data = AbilityData::new("fireball")
        .with_variable("mana", 4)
        .with_graph(FIXTURE_GRAPH);

    let bytes = data.to_bytes().unwrap();
    let back = AbilityData::from_bytes(&bytes).unwrap();

    assert_eq!(back.name(), "fireball");
    assert_eq!(back.blackboard(), &[BlackboardVariable::new("mana", 4)]);
    assert_eq!(back.graph_jsons(), &[FIXTURE_GRAPH.to_string()]);

    assert!(matches!(
        AbilityData::from_bytes(&[1, 2, 3]),
        Err(DataError::DecodeError(_))
    ));
}

#[test]
fn test_ability_data_file_round_trip() {
    let path = std::env::temp_dir().join("waza-codec-pack.bin");
    let path = path.to_str().unwrap();

    let data = AbilityData::new("fireball").with_graph(FIXTURE_GRAPH);
    data.save(path).unwrap();
    let back = AbilityData::from_file(path).unwrap();
    std::fs::remove_file(path).ok();

    assert_eq!(back.name(), "fireball");
    assert_eq!(back.graph_jsons().len(), 1);

    assert!(matches!(
        AbilityData::from_file("/no/such/dir/pack.bin"),
        Err(DataError::Io { .. })
    ));
}
