//! Input and interaction bindings: keys, keyboard movement, clicks,
//! collisions and mouse following.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::collision::{CollisionCallback, CollisionRules};
use crate::components::movement::{KeyMover, MoveKind};
use crate::components::pointer::{ClickCallback, ClickHandlers, Follow};
use crate::error::EngineResult;
use crate::ops::movement::step;
use crate::ops::sprite;
use crate::resources::keybindings::{KeyBindings, KeyCallback, KeyDirection};

/// Bind `callback` to `key`. A second registration for the same key and
/// direction replaces the first.
pub fn register_key(world: &mut World, key: &str, direction: KeyDirection, callback: impl Fn(&mut World) + Send + Sync + 'static) {
    let callback: KeyCallback = Arc::new(callback);
    world.resource_mut::<KeyBindings>().register(key, direction, callback);
}

/// Drive `entity` from the keyboard. Each bound key moves `spaces` cells;
/// holding a key keeps moving once each step completes.
pub fn keys(world: &mut World, entity: Entity, mover: KeyMover, direction: KeyDirection) -> EngineResult<()> {
    sprite(world, entity)?;
    let bindings: Vec<(String, (i32, i32))> = mover.scheme.bindings().map(|(k, v)| (k.to_string(), v)).collect();
    world.entity_mut(entity).insert(mover);
    for (key, unit) in bindings {
        let bound = key.clone();
        register_key(world, &key, direction, move |world| key_step(world, entity, &bound, unit));
    }
    Ok(())
}

fn key_step(world: &mut World, entity: Entity, key: &str, unit: (i32, i32)) {
    let Some(mover) = world.get::<KeyMover>(entity) else {
        return;
    };
    let vector = (unit.0 * mover.spaces, unit.1 * mover.spaces);
    let precondition = mover.precondition.clone();
    let key = key.to_string();
    let result = step(
        world,
        entity,
        vector,
        MoveKind::Step,
        precondition,
        Some(Box::new(move |world: &mut World, entity: Entity| {
            if world.resource::<KeyBindings>().is_pressed(&key) {
                key_step(world, entity, &key, unit);
            }
        })),
    );
    if let Err(e) = result {
        debug!("key move for {:?} ignored: {}", entity, e);
    }
}

/// Call `callback(world, entity, other)` while `entity` overlaps any of
/// `others`. Collisions with itself are never reported.
pub fn collides(world: &mut World, entity: Entity, others: &[Entity], callback: impl Fn(&mut World, Entity, Entity) + Send + Sync + 'static) -> EngineResult<()> {
    sprite(world, entity)?;
    let callback: CollisionCallback = Arc::new(callback);
    if world.get::<CollisionRules>(entity).is_none() {
        world.entity_mut(entity).insert(CollisionRules::default());
    }
    if let Some(mut rules) = world.get_mut::<CollisionRules>(entity) {
        for &other in others.iter().filter(|&&o| o != entity) {
            rules.add(other, callback.clone());
        }
    }
    Ok(())
}

/// Call `callback` when `button` is pressed over `entity`. The click
/// position is stored in the sprite's `event_pos`.
pub fn clicked(world: &mut World, entity: Entity, button: u8, callback: impl Fn(&mut World, Entity) + Send + Sync + 'static) -> EngineResult<()> {
    sprite(world, entity)?;
    let callback: ClickCallback = Arc::new(callback);
    match world.get_mut::<ClickHandlers>(entity) {
        Some(mut handlers) => handlers.add(button, callback),
        None => {
            let mut handlers = ClickHandlers::default();
            handlers.add(button, callback);
            world.entity_mut(entity).insert(handlers);
        }
    }
    Ok(())
}

/// Recentre `entity` on the mouse cursor as it moves.
pub fn follow(world: &mut World, entity: Entity) -> EngineResult<()> {
    sprite(world, entity)?;
    world.entity_mut(entity).insert(Follow);
    Ok(())
}
