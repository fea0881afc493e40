use crate::graph::value::{Value, ValueKind};
use ahash::AHashMap;

/// Conversion function between two value kinds.
pub type ConvertFn = fn(&Value) -> Value;

/// Pairwise value conversions applied when a connected outport's kind
/// differs from the reading inport's declared kind.
///
/// Each graph owns its own table (cloned from the registry at
/// instantiation), so registering a converter never changes graphs that
/// already exist. A missing pair is not an error; the read falls back to
/// the inport's kind default.
#[derive(Debug, Clone)]
pub struct ConverterTable {
    table: AHashMap<(ValueKind, ValueKind), ConvertFn>,
}

impl ConverterTable {
    /// An empty table with no registered conversions.
    pub fn empty() -> Self {
        Self {
            table: AHashMap::new(),
        }
    }

    /// The standard conversions: Int↔Bool, Int→String, Bool→String and
    /// Entity→List (singleton).
    pub fn with_defaults() -> Self {
        let mut converters = Self::empty();
        converters.register(ValueKind::Int, ValueKind::Bool, |v| {
            Value::Bool(matches!(v, Value::Int(i) if *i != 0))
        });
        converters.register(ValueKind::Bool, ValueKind::Int, |v| {
            Value::Int(matches!(v, Value::Bool(true)) as i32)
        });
        converters.register(ValueKind::Int, ValueKind::String, |v| {
            Value::String(v.to_string())
        });
        converters.register(ValueKind::Bool, ValueKind::String, |v| {
            Value::String(v.to_string())
        });
        converters.register(ValueKind::Entity, ValueKind::List, |v| match v {
            Value::Entity(id) => Value::List(vec![*id]),
            _ => Value::List(Vec::new()),
        });
        converters
    }

    /// Registers a conversion, replacing any previous one for the pair.
    pub fn register(&mut self, from: ValueKind, to: ValueKind, f: ConvertFn) {
        self.table.insert((from, to), f);
    }

    pub fn get(&self, from: ValueKind, to: ValueKind) -> Option<ConvertFn> {
        self.table.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for ConverterTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
