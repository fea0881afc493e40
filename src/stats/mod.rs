//! Stat owners, modifiers and the refresh pipeline.

pub mod definition;
pub mod handler;
pub mod modifier;
pub mod owner;
pub mod repository;
pub mod stat;

pub use definition::{StatDefinition, StatDefinitionTable};
pub use handler::{AddendModifierHandler, ModifierHandler};
pub use modifier::{ModifierOp, StatModifier, StatModifierItem};
pub use owner::{OwnerId, StatOwner};
pub use repository::StatOwnerRepository;
pub use stat::Stat;
