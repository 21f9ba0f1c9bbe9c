//! Actor state snapshots.
//!
//! An [`ActorState`] holds wealth, health, energy and inventory quantities.
//! The blob format is JSON; callers treat it as opaque.

use std::collections::BTreeMap;
use std::path::Path;

use bevy_ecs::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};

use crate::components::actor::Actor;
use crate::components::stats::Stats;
use crate::error::{EngineError, EngineResult};
use crate::ops::actor::{inventory, stats};
use crate::resources::inventory::{InventoryRegistry, Quantity};

/// Missing fields are left untouched on load.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ActorState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wealth: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<BTreeMap<String, Quantity>>,
}

pub fn dump_state(world: &World, entity: Entity) -> EngineResult<ActorState> {
    let s = stats(world, entity)?;
    Ok(ActorState {
        wealth: Some(s.wealth()),
        health: Some(s.health()),
        energy: Some(s.energy()),
        inventory: Some(inventory(world, entity)?.dump_state()),
    })
}

/// Restore a snapshot. Quantities are only restored for things the actor
/// already holds.
pub fn load_state(world: &mut World, entity: Entity, state: &ActorState) -> EngineResult<()> {
    stats(world, entity)?;
    if let Some(mut s) = world.get_mut::<Stats>(entity) {
        s.restore(state.health, state.energy, state.wealth);
    }
    if let Some(quantities) = &state.inventory {
        let key = world
            .get::<Actor>(entity)
            .map(|a| a.inventory.clone())
            .ok_or(EngineError::NotAnActor(entity))?;
        world.resource_mut::<InventoryRegistry>().get_or_create(&key).load_state(quantities);
    }
    Ok(())
}

pub fn to_blob(state: &ActorState) -> EngineResult<Vec<u8>> {
    serde_json::to_vec(state).map_err(|e| EngineError::Persistence(e.to_string()))
}

pub fn from_blob(blob: &[u8]) -> EngineResult<ActorState> {
    serde_json::from_slice(blob).map_err(|e| EngineError::Persistence(e.to_string()))
}

/// Write the actor's snapshot to `path`.
pub fn save_state(world: &World, entity: Entity, path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    let blob = to_blob(&dump_state(world, entity)?)?;
    std::fs::write(path, blob).map_err(|e| EngineError::Persistence(format!("{}: {}", path.display(), e)))?;
    info!("saved state of {:?} to {}", entity, path.display());
    Ok(())
}

/// Load a snapshot from `path`. Returns `false` when the file does not exist.
pub fn load_state_file(world: &mut World, entity: Entity, path: impl AsRef<Path>) -> EngineResult<bool> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(false);
    }
    let blob = std::fs::read(path).map_err(|e| EngineError::Persistence(format!("{}: {}", path.display(), e)))?;
    load_state(world, entity, &from_blob(&blob)?)?;
    info!("loaded state of {:?} from {}", entity, path.display());
    Ok(true)
}
