use crate::stats::OwnerId;
use std::fmt;

/// Runtime values carried by graph ports and node variables.
///
/// The set is closed on purpose: every port and variable declares one of
/// these kinds, and reads that cross kinds go through the conversion table
/// or fall back to the kind default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    String(String),
    /// Reference to a stat owner (a game entity).
    Entity(OwnerId),
    /// Ordered list of stat-owner references.
    List(Vec<OwnerId>),
}

/// Discriminant of [`Value`], used for port and variable declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    String,
    Entity,
    List,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::String(_) => ValueKind::String,
            Value::Entity(_) => ValueKind::Entity,
            Value::List(_) => ValueKind::List,
        }
    }

    /// The neutral value a disconnected or unconvertible read falls back to.
    pub fn default_of(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::Int(0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Entity => Value::Entity(OwnerId(0)),
            ValueKind::List => Value::List(Vec::new()),
        }
    }

    pub fn into_bool(self) -> bool {
        match self {
            Value::Bool(b) => b,
            _ => false,
        }
    }

    pub fn into_int(self) -> i32 {
        match self {
            Value::Int(i) => i,
            _ => 0,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Value::String(s) => s,
            _ => String::new(),
        }
    }

    pub fn into_entity(self) -> OwnerId {
        match self {
            Value::Entity(id) => id,
            _ => OwnerId(0),
        }
    }

    pub fn into_list(self) -> Vec<OwnerId> {
        match self {
            Value::List(ids) => ids,
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{}", s),
            Value::Entity(id) => write!(f, "#{}", id.0),
            Value::List(ids) => {
                write!(f, "[")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "#{}", id.0)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::String => "string",
            ValueKind::Entity => "entity",
            ValueKind::List => "list",
        };
        write!(f, "{}", name)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<OwnerId> for Value {
    fn from(id: OwnerId) -> Self {
        Value::Entity(id)
    }
}

impl From<Vec<OwnerId>> for Value {
    fn from(ids: Vec<OwnerId>) -> Self {
        Value::List(ids)
    }
}
