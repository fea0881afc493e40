use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Authored description of one stat kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDefinition {
    pub id: i32,
    pub name: String,
}

impl StatDefinition {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The closed set of stat kinds a repository accepts.
///
/// Built once from authored definitions. A duplicate id is an authoring
/// error: both the definition already registered and the one colliding
/// with it are reported and the whole build yields `None`.
#[derive(Debug, Clone, Default)]
pub struct StatDefinitionTable {
    defs: IndexMap<i32, StatDefinition>,
}

impl StatDefinitionTable {
    pub fn build(definitions: Vec<StatDefinition>) -> Option<Self> {
        let mut defs: IndexMap<i32, StatDefinition> = IndexMap::new();
        let mut ok = true;
        for definition in definitions {
            if let Some(existing) = defs.get(&definition.id) {
                error!(
                    id = existing.id,
                    name = %existing.name,
                    "Stat id is already taken by this definition"
                );
                error!(
                    id = definition.id,
                    name = %definition.name,
                    "Conflicting stat definition rejected"
                );
                ok = false;
                continue;
            }
            defs.insert(definition.id, definition);
        }
        ok.then_some(Self { defs })
    }

    /// Looks a definition up, reporting unknown ids.
    pub fn definition(&self, id: i32) -> Option<&StatDefinition> {
        let found = self.defs.get(&id);
        if found.is_none() {
            error!(id, "Unknown stat id");
        }
        found
    }

    pub fn contains(&self, id: i32) -> bool {
        self.defs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatDefinition> {
        self.defs.values()
    }
}
