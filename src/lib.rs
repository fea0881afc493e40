//! # Waza - Ability Execution Engine
//!
//! **Waza** is an embeddable execution engine for data-driven game abilities. Designers
//! author abilities as node graphs; the engine loads those graphs at runtime, wires them
//! into flows and drives them turn by turn against the game's stats and events. Nothing
//! here is async or threaded: one call into the system runs the queue until it drains,
//! pauses or fails, which makes the engine predictable enough to sit inside a game loop
//! or a server tick.
//!
//! ## Core Workflow
//!
//! 1.  **Author graphs**: Nodes, their variable values and the edges between them live in
//!     a JSON document per flow. The reserved `_id`, `_position` and `_type` keys identify
//!     each node; everything else is node configuration.
//! 2.  **Pack abilities**: [`AbilityData`](data::AbilityData) bundles a name, shared
//!     variables and any number of graph documents, and saves to a compact binary pack.
//! 3.  **Build a system**: [`AbilitySystem::builder`](system::AbilitySystem::builder)
//!     collects stat definitions, custom node types, converters and the trigger mode,
//!     then builds the one object the game talks to.
//! 4.  **Queue and run**: `get_ability` instantiates a pack, `try_enqueue_ability` queues
//!     its eligible flows, and `run` steps them until the queue parks or drains. Paused
//!     flows continue through `resume` or `tick`.
//!
//! ## Quick Start
//!
//! ```rust
//! use waza::prelude::*;
//!
//! let graph = r#"{
//!     "nodes": [
//!         { "_id": 1, "_type": "startNode" },
//!         { "_id": 2, "_type": "logNode" },
//!         { "_id": 3, "_type": "stringNode", "text": "cast!" }
//!     ],
//!     "edges": [
//!         { "source": 1, "source_port": "next", "target": 2, "target_port": "previous" },
//!         { "source": 3, "source_port": "output", "target": 2, "target_port": "text" }
//!     ]
//! }"#;
//!
//! let data = AbilityData::new("fireball").with_graph(graph);
//! let mut system = AbilitySystem::builder().build();
//!
//! let handle = system.get_ability(&data);
//! assert!(system.try_enqueue_ability(handle, None));
//! system.run().unwrap();
//!
//! let ability = system.ability(handle).unwrap();
//! assert_eq!(ability.flow(0).unwrap().current_state(), FlowState::Done);
//! ```
//!
//! ## Custom Nodes
//!
//! Games extend the engine by implementing [`NodeLogic`](graph::NodeLogic) and describing
//! the node's shape with a [`NodeDescriptor`](graph::NodeDescriptor); registered
//! descriptors deserialize by their type tag exactly like the built-ins. Value
//! conversions between port kinds go through the same builder with
//! [`with_converter`](system::AbilitySystemBuilder::with_converter).
//!
//! ## Failure Policy
//!
//! Authoring defects (unknown node types, bad edges, mistyped values) and usage mistakes
//! (resuming an idle system, reading an unknown variable) are reported through
//! [`tracing`] and degrade to no-ops; a loaded ability keeps running with whatever parsed
//! cleanly. The only hard failures are malformed JSON at the data boundary and a failed
//! runner step, both surfaced as [`Result`]s.

pub mod ability;
pub mod data;
pub mod error;
pub mod event;
pub mod flow;
pub mod graph;
pub mod nodes;
pub mod prelude;
pub mod runner;
pub mod stats;
pub mod system;
