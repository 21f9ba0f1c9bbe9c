use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;

/// Named additive counters, kept across soft resets.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    counters: BTreeMap<String, f64>,
}

impl Statistics {
    pub fn exists(&self, key: &str) -> bool {
        self.counters.contains_key(key)
    }

    /// Add `value` to `key`, starting from zero.
    pub fn add(&mut self, key: &str, value: f64) -> f64 {
        let slot = self.counters.entry(key.to_string()).or_insert(0.0);
        *slot += value;
        *slot
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.counters.get(key).copied()
    }

    /// Counters in key order.
    pub fn list(&self) -> impl Iterator<Item = (&str, f64)> {
        self.counters.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn dump_state(&self) -> BTreeMap<String, f64> {
        self.counters.clone()
    }

    /// Replace counters present in `state`.
    pub fn load_state(&mut self, state: &BTreeMap<String, f64>) {
        for (k, v) in state {
            self.counters.insert(k.clone(), *v);
        }
    }

    pub fn clear(&mut self) {
        self.counters.clear();
    }
}
