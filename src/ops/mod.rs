//! World-level operations.
//!
//! Every operation takes the [`World`] explicitly and addresses sprites by
//! [`Entity`]. Submodules overview:
//! - [`spawn`] – image, shape, actor and text spawners, `destroy`, tag queries, `fill`
//! - [`movement`] – `move_by`, `move_to` and the waypoint queue, `stop`, `speed`
//! - [`actor`] – actions, vitals, facing queries, inventory use
//! - [`effects`] – `animate`, `destruct`, `fade`, `spin`, `pulse`, `float`, `bouncy`, `wander`, timed callbacks
//! - [`game`] – `pause`, `resume`, `gameover`
//! - [`score`] – corner scoreboards, `timer`, `stopwatch`
//! - [`input`] – key bindings, keyboard movement, clicks, collisions, follow
//! - [`persistence`] – actor state to and from an opaque blob

use bevy_ecs::prelude::*;

use crate::components::sprite::Sprite;
use crate::error::{EngineError, EngineResult};

pub mod actor;
pub mod effects;
pub mod game;
pub mod input;
pub mod movement;
pub mod persistence;
pub mod score;
pub mod spawn;

pub(crate) fn sprite(world: &World, entity: Entity) -> EngineResult<&Sprite> {
    world.get::<Sprite>(entity).ok_or(EngineError::UnknownEntity(entity))
}

pub(crate) fn sprite_mut(world: &mut World, entity: Entity) -> EngineResult<Mut<'_, Sprite>> {
    world.get_mut::<Sprite>(entity).ok_or(EngineError::UnknownEntity(entity))
}

/// Whether `entity` still exists as a sprite.
pub fn exists(world: &World, entity: Entity) -> bool {
    world.get::<Sprite>(entity).is_some()
}
