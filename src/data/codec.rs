use indexmap::IndexMap;
use itertools::Itertools;
use tracing::{error, warn};

use crate::data::registry::NodeRegistry;
use crate::data::schema::{EdgeData, GraphData, NodeData};
use crate::error::CodecError;
use crate::graph::{AbilityGraph, Value, ValueKind};
use crate::stats::OwnerId;

/// Builds a runnable graph from its JSON document.
///
/// Malformed JSON is the only hard failure. Inside a well-formed
/// document every defect degrades locally: unknown node types become
/// placeholders, unknown fields and wrong-typed values keep the declared
/// default, edges to missing or placeholder nodes are dropped. Each
/// defect is reported once.
pub fn deserialize_graph(json: &str, registry: &NodeRegistry) -> Result<AbilityGraph, CodecError> {
    let data: GraphData =
        serde_json::from_str(json).map_err(|e| CodecError::JsonParseError(e.to_string()))?;
    Ok(build_graph(&data, registry))
}

/// Writes a graph back to its JSON document.
///
/// Dynamic ports are runtime-only, so edges touching one are not
/// emitted. Everything else round-trips: node order, positions, variable
/// values and the blackboard template.
pub fn serialize_graph(graph: &AbilityGraph) -> Result<String, CodecError> {
    let mut data = GraphData {
        blackboard: graph.blackboard().to_vec(),
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    for node in graph.nodes() {
        let mut fields = IndexMap::new();
        for variable in node.variables() {
            fields.insert(variable.name().to_owned(), value_to_json(variable.value()));
        }
        data.nodes.push(NodeData {
            id: node.id(),
            position: node.position(),
            type_name: node.type_name().to_owned(),
            fields,
        });
    }
    for node in graph.nodes() {
        for outport in node.outports() {
            if outport.is_dynamic() {
                continue;
            }
            for link in outport.connections() {
                let Some(target) = graph.node(link.node) else {
                    continue;
                };
                let Some(inport) = target.inports().get(link.port) else {
                    continue;
                };
                if inport.is_dynamic() {
                    continue;
                }
                data.edges.push(EdgeData {
                    source: node.id(),
                    source_port: outport.name().to_owned(),
                    target: target.id(),
                    target_port: inport.name().to_owned(),
                });
            }
        }
    }
    serde_json::to_string_pretty(&data).map_err(|e| CodecError::JsonEncodeError(e.to_string()))
}

fn build_graph(data: &GraphData, registry: &NodeRegistry) -> AbilityGraph {
    let mut graph = AbilityGraph::new();
    graph.set_converters(registry.converters().clone());
    graph.set_blackboard(data.blackboard.clone());

    for id in data.nodes.iter().map(|node| node.id).duplicates() {
        warn!(id, "duplicate node id in graph data, edges resolve to the first");
    }

    for node_data in &data.nodes {
        let mut node = registry.instantiate(&node_data.type_name);
        node.set_id(node_data.id);
        node.set_position(node_data.position);
        for (field, raw) in &node_data.fields {
            let kind = match node.variable(field) {
                Some(variable) => variable.kind(),
                None => {
                    warn!(
                        node = node_data.id,
                        field = %field,
                        "unknown field in node data, skipped"
                    );
                    continue;
                }
            };
            match value_from_json(raw, kind) {
                Some(value) => {
                    node.set_variable(field, value);
                }
                None => error!(
                    node = node_data.id,
                    field = %field,
                    expected = %kind,
                    "field value has the wrong type, keeping the default"
                ),
            }
        }
        graph.add_node(node);
    }

    for edge in &data.edges {
        let Some(source) = graph.node_index_by_id(edge.source) else {
            error!(source = edge.source, "edge references a missing source node, skipped");
            continue;
        };
        let Some(target) = graph.node_index_by_id(edge.target) else {
            error!(target = edge.target, "edge references a missing target node, skipped");
            continue;
        };
        let touches_placeholder = graph.node(source).is_some_and(|n| n.is_undefined())
            || graph.node(target).is_some_and(|n| n.is_undefined());
        if touches_placeholder {
            warn!(
                source = edge.source,
                target = edge.target,
                "edge touches an unknown node type, skipped"
            );
            continue;
        }
        graph.connect(source, &edge.source_port, target, &edge.target_port);
    }
    graph
}

fn value_from_json(raw: &serde_json::Value, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Bool => raw.as_bool().map(Value::Bool),
        ValueKind::Int => json_i32(raw).map(Value::Int),
        ValueKind::String => raw.as_str().map(|s| Value::String(s.to_owned())),
        ValueKind::Entity => json_i32(raw).map(|id| Value::Entity(OwnerId(id))),
        ValueKind::List => raw.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| json_i32(item).map(OwnerId))
                .collect::<Option<Vec<_>>>()
                .map(Value::List)
        }),
    }
}

fn json_i32(raw: &serde_json::Value) -> Option<i32> {
    raw.as_i64().and_then(|v| i32::try_from(v).ok())
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => (*v).into(),
        Value::Int(v) => (*v).into(),
        Value::String(v) => v.clone().into(),
        Value::Entity(id) => id.0.into(),
        Value::List(ids) => ids.iter().map(|id| id.0).collect::<Vec<_>>().into(),
    }
}
