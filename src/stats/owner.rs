use std::fmt;

use ahash::AHashMap;

use crate::stats::modifier::StatModifier;
use crate::stats::stat::Stat;

/// Opaque handle for a stat owner.
///
/// Ids are drawn at random from the positive `i32` range when the owner
/// is created, so they double as unique entity references inside graph
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub i32);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One entity's stats and the modifiers currently attached to it.
pub struct StatOwner {
    id: OwnerId,
    stats: AHashMap<i32, Stat>,
    modifiers: Vec<StatModifier>,
}

impl StatOwner {
    pub(crate) fn new(id: OwnerId) -> Self {
        Self {
            id,
            stats: AHashMap::new(),
            modifiers: Vec::new(),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    pub fn has_stat(&self, stat_id: i32) -> bool {
        self.stats.contains_key(&stat_id)
    }

    pub fn stat(&self, stat_id: i32) -> Option<&Stat> {
        self.stats.get(&stat_id)
    }

    pub fn stat_mut(&mut self, stat_id: i32) -> Option<&mut Stat> {
        self.stats.get_mut(&stat_id)
    }

    pub fn stats(&self) -> impl Iterator<Item = &Stat> {
        self.stats.values()
    }

    pub(crate) fn insert_stat(&mut self, stat: Stat) {
        self.stats.insert(stat.id, stat);
    }

    /// Attaches a modifier. Takes effect at the next refresh.
    pub fn add_modifier(&mut self, modifier: StatModifier) {
        self.modifiers.push(modifier);
    }

    pub fn clear_modifiers(&mut self) {
        self.modifiers.clear();
    }

    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Drops every stat back to its base value.
    pub(crate) fn reset_stats(&mut self) {
        for stat in self.stats.values_mut() {
            stat.current = stat.base;
        }
    }
}
