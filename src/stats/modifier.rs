/// How a modifier item combines with a stat.
///
/// The built-in handler aggregates `Add` items; `Mul` is reserved for a
/// custom [`ModifierHandler`](crate::stats::ModifierHandler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierOp {
    Add,
    Mul,
}

/// One adjustment to one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatModifierItem {
    pub stat_id: i32,
    pub op: ModifierOp,
    pub value: i32,
}

impl StatModifierItem {
    pub fn new(stat_id: i32, op: ModifierOp, value: i32) -> Self {
        Self { stat_id, op, value }
    }

    pub fn add(stat_id: i32, value: i32) -> Self {
        Self::new(stat_id, ModifierOp::Add, value)
    }
}

/// A bundle of items applied and removed together, e.g. one buff.
#[derive(Debug, Clone, Default)]
pub struct StatModifier {
    items: Vec<StatModifierItem>,
}

impl StatModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item: StatModifierItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn push(&mut self, item: StatModifierItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[StatModifierItem] {
        &self.items
    }
}
