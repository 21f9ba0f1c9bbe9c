//! Inventories and the registry that owns them.
//!
//! Actors that share a tag share one [`Inventory`]: the registry is keyed by
//! tag and every actor only stores its key. Untagged actors get a private
//! key derived from their entity.

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How many of a thing are held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Count(u32),
    Unlimited,
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Count(1)
    }
}

impl Quantity {
    pub fn increment(&mut self) {
        if let Quantity::Count(n) = self {
            *n = n.saturating_add(1);
        }
    }
}

/// Something an actor can hold or buy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub name: String,
    pub quantity: Quantity,
    /// Price in wealth; `None` cannot be bought.
    pub cost: Option<f32>,
    /// Energy granted when bought.
    pub energy: f32,
    pub lethality: f32,
}

impl Thing {
    pub fn new(name: impl Into<String>) -> Self {
        Thing {
            name: name.into(),
            quantity: Quantity::Count(1),
            cost: Some(1000.0),
            energy: 1.0,
            lethality: 100.0,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_cost(mut self, cost: Option<f32>) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_lethality(mut self, lethality: f32) -> Self {
        self.lethality = lethality;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    things: BTreeMap<String, Thing>,
}

impl Inventory {
    /// Store `thing`. A thing with the same name keeps its held quantity.
    pub fn add(&mut self, mut thing: Thing) {
        if let Some(old) = self.things.get(&thing.name) {
            thing.quantity = old.quantity;
        }
        self.things.insert(thing.name.clone(), thing);
    }

    pub fn get(&self, name: &str) -> Option<&Thing> {
        self.things.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Thing> {
        self.things.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.things.contains_key(name)
    }

    /// Things in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Thing> {
        self.things.values()
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    /// Quantities by thing name.
    pub fn dump_state(&self) -> BTreeMap<String, Quantity> {
        self.things.iter().map(|(k, t)| (k.clone(), t.quantity)).collect()
    }

    /// Restore quantities of things already held; unknown names are ignored.
    pub fn load_state(&mut self, state: &BTreeMap<String, Quantity>) {
        for (name, quantity) in state {
            if let Some(thing) = self.things.get_mut(name) {
                thing.quantity = *quantity;
            }
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct InventoryRegistry {
    inventories: FxHashMap<String, Inventory>,
}

impl InventoryRegistry {
    /// Registry key for an actor: its tag, or a private key when untagged.
    pub fn key_for(tag: Option<&str>, entity: Entity) -> String {
        match tag {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("#{}", entity),
        }
    }

    pub fn get_or_create(&mut self, key: &str) -> &mut Inventory {
        self.inventories.entry(key.to_string()).or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Inventory> {
        self.inventories.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Inventory> {
        self.inventories.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.inventories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventories.is_empty()
    }

    pub fn clear(&mut self) {
        self.inventories.clear();
    }
}
