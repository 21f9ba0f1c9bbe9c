//! Per-tick actor updates.
//!
//! Every tick each actor first runs its [`Defend`] hook, then shows its
//! current frame and advances its frame counter. See
//! [`Actor::advance_frame`] for loop and idle handling.

use bevy_ecs::prelude::*;

use crate::components::actor::{Actor, Defend};
use crate::components::sprite::{SpawnOrder, Sprite, Visual};
use crate::components::stats::Stats;

/// Run every actor's [`Defend`] hook in spawn order. Hooks of actors
/// destroyed by an earlier hook in the same tick are skipped.
pub fn run_defenders(world: &mut World) {
    let mut hooks: Vec<_> = world
        .query_filtered::<(Entity, &Defend, Option<&SpawnOrder>), With<Actor>>()
        .iter(world)
        .map(|(entity, defend, order)| (SpawnOrder::key(order, entity), defend.0.clone()))
        .collect();
    hooks.sort_by_key(|(key, _)| *key);
    for ((_, entity), hook) in hooks {
        if world.get::<Actor>(entity).is_some() {
            hook(world, entity);
        }
    }
}

pub fn actor_frames(mut query: Query<(&mut Actor, &mut Sprite, Option<&Stats>)>) {
    for (mut actor, mut sprite, stats) in query.iter_mut() {
        if let Some(frame) = actor.current_frame() {
            let key = frame.key.clone();
            if !matches!(&sprite.visual, Visual::Image(k) if *k == key) {
                sprite.visual = Visual::Image(key);
            }
        }
        let alive = stats.is_none_or(|s| s.is_alive());
        actor.advance_frame(alive);
    }
}
