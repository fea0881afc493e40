//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the waza crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! // Use the prelude to get easy access to all the core types.
//! use waza::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! // Load a packed ability and stand up a system
//! let data = AbilityData::from_file("path/to/fireball.ability")?;
//! let mut system = AbilitySystem::builder().build();
//!
//! // Instantiate, queue and run
//! let handle = system.get_ability(&data);
//! system.try_enqueue_ability(handle, None);
//! system.run()?;
//! # Ok(())
//! # }
//! ```

// The system facade and its configuration
pub use crate::system::{AbilityHandle, AbilitySystem, AbilitySystemBuilder};

// Abilities and flows
pub use crate::ability::{Ability, VariableStore};
pub use crate::flow::{AbilityFlow, FlowScope, FlowState};

// Graph model and node authoring
pub use crate::graph::{
    AbilityGraph, ConverterTable, Node, NodeContext, NodeDescriptor, NodeKind, NodeLogic, Outputs,
    Value, ValueContext, ValueKind,
};

// Data boundary
pub use crate::data::{
    AbilityData, BlackboardVariable, NodeRegistry, deserialize_graph, serialize_graph,
};

// Scheduling
pub use crate::runner::{
    EventTriggerMode, ExecutionType, FlowQueue, ResultState, RunningState, StepResult,
};

// Events
pub use crate::event::{EventPayload, EventQueue, payload};

// Stats
pub use crate::stats::{
    ModifierHandler, ModifierOp, OwnerId, Stat, StatDefinition, StatModifier, StatModifierItem,
    StatOwner, StatOwnerRepository,
};

// Error types
pub use crate::error::{CodecError, DataError, RunnerError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
