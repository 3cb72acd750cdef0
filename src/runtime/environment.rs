use crate::runtime::{
    channel::Channel,
    error::{RuntimeError, RuntimeResult},
    value::Value,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The single global environment shared by every worker. Every read and
/// write goes through one mutex; user-level locks and atomic sections are
/// the only ordering guarantees on top of that.
#[derive(Clone, Default)]
pub struct Globals {
    slots: Arc<Mutex<HashMap<String, Value>>>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: Value) {
        self.slots.lock().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.lock().get(name).cloned()
    }

    /// Reads of unknown names never fail; they yield zero. Preserved
    /// permissive behavior, not an oversight.
    pub fn read_or_zero(&self, name: &str) -> Value {
        self.get(name).unwrap_or(Value::Int(0))
    }

    /// Channel operations, by contrast, hard-fail on unresolved names.
    pub fn channel(&self, name: &str) -> RuntimeResult<Channel> {
        match self.get(name) {
            Some(Value::Chan(chan)) => Ok(chan),
            Some(_) => Err(RuntimeError::NotAChannel {
                name: name.to_string(),
            }),
            None => Err(RuntimeError::UnknownChannel {
                name: name.to_string(),
            }),
        }
    }

    /// Sorted copy of the current state, for the final state dump.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.slots
            .lock()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
