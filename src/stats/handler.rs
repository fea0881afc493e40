use ahash::AHashMap;
use tracing::debug;

use crate::stats::modifier::ModifierOp;
use crate::stats::owner::StatOwner;

/// Folds an owner's modifiers back into its stats during a refresh.
///
/// Handlers run in registration order over stats that were already reset
/// to base, so each handler sees the output of the ones before it.
/// Registering a custom handler is how games add multiplicative or
/// capped stacking on top of the built-in additive pass.
pub trait ModifierHandler: Send {
    fn refresh_stats(&mut self, owner: &mut StatOwner);
}

/// The built-in additive pass.
///
/// Sums every `Add` item per stat id across all modifiers, then bumps
/// each matching stat's current value by its sum. The sums map is owned
/// by the handler instance and cleared at the start of every call.
#[derive(Debug, Default)]
pub struct AddendModifierHandler {
    sums: AHashMap<i32, i32>,
}

impl ModifierHandler for AddendModifierHandler {
    fn refresh_stats(&mut self, owner: &mut StatOwner) {
        let owner_id = owner.id();
        self.sums.clear();
        for modifier in owner.modifiers() {
            for item in modifier.items() {
                if item.op == ModifierOp::Add {
                    *self.sums.entry(item.stat_id).or_insert(0) += item.value;
                }
            }
        }
        for (stat_id, sum) in &self.sums {
            match owner.stat_mut(*stat_id) {
                Some(stat) => stat.current += *sum,
                None => debug!(
                    owner = %owner_id,
                    stat = stat_id,
                    "modifier targets a stat the owner does not have"
                ),
            }
        }
    }
}
