//! The built-in node library.
//!
//! Registered by type tag through [`NodeRegistry::with_defaults`]; games
//! add their own nodes next to these with
//! [`AbilitySystemBuilder::with_node`](crate::system::AbilitySystemBuilder::with_node).

mod action;
mod entry;
mod values;

use crate::data::NodeRegistry;

/// Registers every built-in node type.
pub fn register_default_nodes(registry: &mut NodeRegistry) {
    entry::register_entry_nodes(registry);
    action::register_action_nodes(registry);
    values::register_value_nodes(registry);
}
