//! Actor operations: actions, vitals, spatial queries and inventory use.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::actor::{resolve_action, ActionResolution, Actor, Defend, Direction, LoopCount, DIE, IDLE};
use crate::components::sprite::Sprite;
use crate::components::stats::{HealthChange, Stats};
use crate::error::{EngineError, EngineResult};
use crate::ops::effects;
use crate::resources::grid::{Cell, SpatialGrid};
use crate::resources::inventory::{Inventory, InventoryRegistry, Quantity, Thing};

fn actor_ref(world: &World, entity: Entity) -> EngineResult<&Actor> {
    if world.get::<Sprite>(entity).is_none() {
        return Err(EngineError::UnknownEntity(entity));
    }
    world.get::<Actor>(entity).ok_or(EngineError::NotAnActor(entity))
}

fn stats_mut(world: &mut World, entity: Entity) -> EngineResult<Mut<'_, Stats>> {
    if world.get::<Sprite>(entity).is_none() {
        return Err(EngineError::UnknownEntity(entity));
    }
    world.get_mut::<Stats>(entity).ok_or(EngineError::NotAnActor(entity))
}

pub fn is_actor(world: &World, entity: Entity) -> bool {
    world.get::<Actor>(entity).is_some()
}

/// Sprites without [`Stats`] count as alive.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world.get::<Stats>(entity).is_none_or(|s| s.is_alive())
}

pub fn stats(world: &World, entity: Entity) -> EngineResult<Stats> {
    actor_ref(world, entity)?;
    world.get::<Stats>(entity).copied().ok_or(EngineError::NotAnActor(entity))
}

/// Request `action`. Dead actors only accept `die*` actions; ignored
/// requests return `Ok(None)`.
pub fn act(world: &mut World, entity: Entity, action: &str, loop_count: LoopCount) -> EngineResult<Option<ActionResolution>> {
    actor_ref(world, entity)?;
    if !is_alive(world, entity) && !action.starts_with(DIE) {
        return Ok(None);
    }
    let Some(mut actor) = world.get_mut::<Actor>(entity) else {
        return Err(EngineError::NotAnActor(entity));
    };
    let resolution = resolve_action(&actor.frames, action, actor.direction);
    match &resolution {
        ActionResolution::Found(name) | ActionResolution::FallbackDirectional(name) => {
            let name = name.clone();
            actor.play(&name, loop_count);
        }
        ActionResolution::FallbackIdle => {
            warn!("unsupported action \"{}\" for {}, going idle", action, actor.name);
            let idle = if actor.frames.contains(IDLE) {
                IDLE.to_string()
            } else {
                actor.frames.idle_for(actor.direction).unwrap_or(IDLE).to_string()
            };
            actor.play(&idle, loop_count);
        }
    }
    Ok(Some(resolution))
}

/// [`act`] for any sprite: a no-op on sprites that are not actors.
pub(crate) fn act_if_actor(world: &mut World, entity: Entity, action: &str, loop_count: LoopCount) {
    if is_actor(world, entity) {
        if let Err(e) = act(world, entity, action, loop_count) {
            warn!("action \"{}\" failed for {:?}: {}", action, entity, e);
        }
    }
}

/// Set health; reaching zero plays `die` once.
pub fn set_health(world: &mut World, entity: Entity, value: f32) -> EngineResult<HealthChange> {
    let change = stats_mut(world, entity)?.set_health(value);
    match change {
        HealthChange::Died => {
            debug!("{:?} died", entity);
            act(world, entity, DIE, LoopCount::Times(1))?;
        }
        HealthChange::Rejected => debug!("health {} rejected for {:?}", value, entity),
        HealthChange::Updated => {}
    }
    Ok(change)
}

pub fn add_energy(world: &mut World, entity: Entity, delta: f32) -> EngineResult<f32> {
    Ok(stats_mut(world, entity)?.add_energy(delta))
}

pub fn add_wealth(world: &mut World, entity: Entity, delta: f32) -> EngineResult<f32> {
    Ok(stats_mut(world, entity)?.add_wealth(delta))
}

/// Kill a living actor and destroy it after `delay` seconds.
pub fn kill(world: &mut World, entity: Entity, delay: f32) -> EngineResult<()> {
    if stats(world, entity)?.is_alive() {
        set_health(world, entity, 0.0)?;
        effects::destruct(world, entity, delay)?;
    }
    Ok(())
}

/// Install `callback` as the actor's per-tick self-defense hook, replacing
/// any previous one.
pub fn defend(world: &mut World, entity: Entity, callback: impl Fn(&mut World, Entity) + Send + Sync + 'static) -> EngineResult<()> {
    actor_ref(world, entity)?;
    world.entity_mut(entity).insert(Defend(Arc::new(callback)));
    Ok(())
}

/// Ticks per animation frame, clamped to `[1, 60]`.
pub fn rate(world: &mut World, entity: Entity, frame_rate: i32) -> EngineResult<()> {
    actor_ref(world, entity)?;
    if let Some(mut actor) = world.get_mut::<Actor>(entity) {
        actor.set_frame_rate(frame_rate);
    }
    Ok(())
}

pub fn direction(world: &World, entity: Entity) -> EngineResult<Direction> {
    Ok(actor_ref(world, entity)?.direction)
}

fn position(world: &World, entity: Entity) -> EngineResult<Cell> {
    Ok(crate::ops::sprite(world, entity)?.pos())
}

/// Cell `distance` cells ahead in the facing direction.
pub fn facing(world: &World, entity: Entity, distance: i32) -> EngineResult<Cell> {
    let dir = direction(world, entity)?;
    Ok(dir.offset(position(world, entity)?, distance))
}

/// Adjacent cell in `direction`.
pub fn next_cell(world: &World, entity: Entity, direction: Direction) -> EngineResult<Cell> {
    Ok(direction.offset(position(world, entity)?, 1))
}

/// First other sprite within `distance` cells along `direction` (the facing
/// direction when `None`). Dead actors are skipped.
pub fn next_object(world: &World, entity: Entity, direction: Option<Direction>, distance: i32) -> EngineResult<Option<Entity>> {
    let dir = match direction {
        Some(d) => d,
        None => self::direction(world, entity)?,
    };
    let origin = position(world, entity)?;
    let grid = world.resource::<SpatialGrid>();
    for step in 0..distance.max(0) {
        let cell = dir.offset(origin, step);
        for other in grid.entities_at(cell) {
            if other == entity || world.get::<Sprite>(other).is_none() {
                continue;
            }
            if is_alive(world, other) {
                return Ok(Some(other));
            }
        }
    }
    Ok(None)
}

/// Action names this actor can play, sorted.
pub fn available_actions(world: &World, entity: Entity) -> EngineResult<Vec<String>> {
    Ok(actor_ref(world, entity)?.frames.names().map(String::from).collect())
}

pub fn inventory(world: &World, entity: Entity) -> EngineResult<&Inventory> {
    let key = &actor_ref(world, entity)?.inventory;
    world
        .resource::<InventoryRegistry>()
        .get(key)
        .ok_or(EngineError::NotAnActor(entity))
}

/// Add `thing` to the actor's (possibly shared) inventory.
pub fn take(world: &mut World, entity: Entity, thing: Thing) -> EngineResult<()> {
    let key = actor_ref(world, entity)?.inventory.clone();
    world.resource_mut::<InventoryRegistry>().get_or_create(&key).add(thing);
    Ok(())
}

/// Buy one more of a held thing. Returns whether the purchase happened:
/// the thing must be held, priced, and affordable.
pub fn buy(world: &mut World, entity: Entity, thing: &str) -> EngineResult<bool> {
    let key = actor_ref(world, entity)?.inventory.clone();
    let wealth = stats(world, entity)?.wealth();
    let (cost, energy) = {
        let mut registry = world.resource_mut::<InventoryRegistry>();
        let Some(item) = registry.get_or_create(&key).get_mut(thing) else {
            return Ok(false);
        };
        let Some(cost) = item.cost else {
            return Ok(false);
        };
        if cost > wealth {
            return Ok(false);
        }
        if item.quantity != Quantity::Unlimited {
            item.quantity.increment();
        }
        (cost, item.energy)
    };
    add_wealth(world, entity, -cost)?;
    if energy > 0.0 {
        add_energy(world, entity, energy)?;
    }
    Ok(true)
}
