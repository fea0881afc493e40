use indexmap::IndexMap;
use rand::Rng;
use tracing::{error, warn};

use crate::stats::definition::StatDefinitionTable;
use crate::stats::handler::{AddendModifierHandler, ModifierHandler};
use crate::stats::owner::{OwnerId, StatOwner};
use crate::stats::stat::Stat;

/// All stat owners of one system, plus the handlers that refresh them.
///
/// Owners live in creation order. The repository validates every stat id
/// against its definition table, so a typo in game code shows up as one
/// reported no-op instead of a silently wrong stat.
pub struct StatOwnerRepository {
    table: StatDefinitionTable,
    owners: IndexMap<OwnerId, StatOwner>,
    handlers: Vec<Box<dyn ModifierHandler>>,
}

impl StatOwnerRepository {
    pub fn new(table: StatDefinitionTable) -> Self {
        Self {
            table,
            owners: IndexMap::new(),
            handlers: vec![Box::new(AddendModifierHandler::default())],
        }
    }

    /// Appends a handler to the refresh chain, after the built-in
    /// additive one.
    pub fn register_handler(&mut self, handler: Box<dyn ModifierHandler>) {
        self.handlers.push(handler);
    }

    /// Creates an owner under a fresh random id. Ids are positive and
    /// redrawn on the (astronomically rare) collision.
    pub fn create_owner(&mut self) -> OwnerId {
        let mut rng = rand::rng();
        loop {
            let id = OwnerId(rng.random_range(1..=i32::MAX));
            if !self.owners.contains_key(&id) {
                self.owners.insert(id, StatOwner::new(id));
                return id;
            }
        }
    }

    pub fn owner(&self, id: OwnerId) -> Option<&StatOwner> {
        let found = self.owners.get(&id);
        if found.is_none() {
            warn!(owner = %id, "unknown owner");
        }
        found
    }

    pub fn owner_mut(&mut self, id: OwnerId) -> Option<&mut StatOwner> {
        let found = self.owners.get_mut(&id);
        if found.is_none() {
            warn!(owner = %id, "unknown owner");
        }
        found
    }

    /// Removes an owner and everything attached to it.
    pub fn remove_owner(&mut self, id: OwnerId) {
        if self.owners.shift_remove(&id).is_none() {
            error!(owner = %id, "remove_owner: unknown owner");
        }
    }

    pub fn owners(&self) -> impl Iterator<Item = &StatOwner> {
        self.owners.values()
    }

    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Gives an owner a stat at the given base value. The stat id must
    /// exist in the definition table and not yet on the owner; violations
    /// are reported and change nothing.
    pub fn add_stat(&mut self, owner: OwnerId, stat_id: i32, base: i32) {
        if !self.table.contains(stat_id) {
            error!(stat = stat_id, "add_stat: stat id is not defined");
            return;
        }
        let Some(entry) = self.owners.get_mut(&owner) else {
            error!(owner = %owner, "add_stat: unknown owner");
            return;
        };
        if entry.has_stat(stat_id) {
            error!(owner = %owner, stat = stat_id, "add_stat: owner already has this stat");
            return;
        }
        entry.insert_stat(Stat::new(stat_id, base));
    }

    /// Recomputes one owner's current values: reset to base, then every
    /// handler in registration order.
    pub fn refresh_stats(&mut self, id: OwnerId) {
        let Self {
            owners, handlers, ..
        } = self;
        let Some(owner) = owners.get_mut(&id) else {
            warn!(owner = %id, "refresh_stats: unknown owner");
            return;
        };
        owner.reset_stats();
        for handler in handlers.iter_mut() {
            handler.refresh_stats(owner);
        }
    }

    /// Recomputes every owner.
    pub fn refresh_all(&mut self) {
        let Self {
            owners, handlers, ..
        } = self;
        for owner in owners.values_mut() {
            owner.reset_stats();
            for handler in handlers.iter_mut() {
                handler.refresh_stats(owner);
            }
        }
    }

    pub fn table(&self) -> &StatDefinitionTable {
        &self.table
    }
}
