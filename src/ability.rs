//! Abilities: named bundles of flows sharing variables and an actor.

use std::any::Any;

use indexmap::IndexMap;
use tracing::{error, warn};

use crate::data::{AbilityData, BlackboardVariable, NodeRegistry};
use crate::flow::AbilityFlow;
use crate::stats::OwnerId;

/// String-keyed integer variables, in declaration order.
///
/// Both the per-flow blackboard and the ability-wide variables use this
/// store. Reads through [`get`](VariableStore::get) report unknown keys
/// and fall back to 0; [`try_get`](VariableStore::try_get) stays quiet.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    entries: IndexMap<String, i32>,
}

impl VariableStore {
    /// Seeds a store from an authored template. Empty keys are skipped,
    /// duplicate keys keep their first value.
    pub fn from_template(template: &[BlackboardVariable]) -> Self {
        let mut entries = IndexMap::new();
        for variable in template {
            if variable.key.is_empty() {
                warn!("blackboard variable with an empty key, skipped");
                continue;
            }
            if entries.contains_key(&variable.key) {
                warn!(key = %variable.key, "duplicate blackboard variable, first value kept");
                continue;
            }
            entries.insert(variable.key.clone(), variable.value);
        }
        Self { entries }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Reads a variable, 0 with a report when the key is unknown.
    pub fn get(&self, key: &str) -> i32 {
        match self.entries.get(key) {
            Some(value) => *value,
            None => {
                warn!(key, "unknown variable, reading as 0");
                0
            }
        }
    }

    pub fn try_get(&self, key: &str) -> Option<i32> {
        self.entries.get(key).copied()
    }

    /// Quiet upsert.
    pub fn set(&mut self, key: &str, value: i32) {
        match self.entries.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.entries.insert(key.to_owned(), value);
            }
        }
    }

    /// Upsert that reports when the key was never declared.
    pub fn override_value(&mut self, key: &str, value: i32) {
        if !self.entries.contains_key(key) {
            warn!(key, "overriding a variable that was never declared");
        }
        self.set(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A loaded ability instance.
///
/// Instantiating [`AbilityData`] clones the authored variable template
/// into a private store, builds one [`AbilityFlow`] per stored graph and
/// enables all of them. Graphs that fail to parse are reported and
/// skipped so one bad graph never takes the whole ability down.
pub struct Ability {
    name: String,
    variables: VariableStore,
    flows: Vec<AbilityFlow>,
    enabled: Vec<bool>,
    actor: Option<OwnerId>,
    user_data: Option<Box<dyn Any + Send>>,
}

impl Ability {
    pub(crate) fn instantiate(data: &AbilityData, registry: &NodeRegistry) -> Self {
        let mut flows = Vec::new();
        for (index, json) in data.graph_jsons().iter().enumerate() {
            match crate::data::deserialize_graph(json, registry) {
                Ok(graph) => flows.push(AbilityFlow::new(graph)),
                Err(err) => error!(
                    ability = data.name(),
                    graph = index,
                    %err,
                    "Skipping graph that failed to parse"
                ),
            }
        }
        let enabled = vec![true; flows.len()];
        Self {
            name: data.name().to_owned(),
            variables: VariableStore::from_template(data.blackboard()),
            flows,
            enabled,
            actor: None,
            user_data: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.has(key)
    }

    /// Reads an ability variable, 0 with a report when missing.
    pub fn variable(&self, key: &str) -> i32 {
        self.variables.get(key)
    }

    /// Overrides an ability variable for every flow of this instance.
    pub fn override_variable(&mut self, key: &str, value: i32) {
        self.variables.override_value(key, value);
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Enables or disables one flow for future enqueues. Out-of-range
    /// indices are reported and ignored.
    pub fn set_enable(&mut self, flow: usize, enabled: bool) {
        match self.enabled.get_mut(flow) {
            Some(slot) => *slot = enabled,
            None => error!(ability = %self.name, flow, "set_enable: no such flow"),
        }
    }

    pub fn is_enabled(&self, flow: usize) -> bool {
        match self.enabled.get(flow) {
            Some(enabled) => *enabled,
            None => {
                error!(ability = %self.name, flow, "is_enabled: no such flow");
                false
            }
        }
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn flow(&self, index: usize) -> Option<&AbilityFlow> {
        self.flows.get(index)
    }

    pub fn flow_mut(&mut self, index: usize) -> Option<&mut AbilityFlow> {
        self.flows.get_mut(index)
    }

    /// Binds the acting owner for this instance and all its flows.
    pub fn set_actor(&mut self, actor: Option<OwnerId>) {
        self.actor = actor;
        for flow in &mut self.flows {
            flow.set_actor(actor);
        }
    }

    pub fn actor(&self) -> Option<OwnerId> {
        self.actor
    }

    /// Attaches arbitrary caller state to this instance.
    pub fn set_user_data<T: Any + Send>(&mut self, value: T) {
        self.user_data = Some(Box::new(value));
    }

    /// Reads the attached state back. Absent or differently typed data is
    /// reported and reads as `None`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        match self.user_data.as_deref() {
            Some(data) => {
                let downcast = data.downcast_ref::<T>();
                if downcast.is_none() {
                    warn!(ability = %self.name, "user data has a different type");
                }
                downcast
            }
            None => {
                warn!(ability = %self.name, "no user data attached");
                None
            }
        }
    }

    pub(crate) fn flow_and_vars(
        &mut self,
        index: usize,
    ) -> Option<(&mut AbilityFlow, &mut VariableStore)> {
        let Self {
            flows, variables, ..
        } = self;
        flows.get_mut(index).map(|flow| (flow, &mut *variables))
    }
}
