//! Animation-driven effects and timed callbacks.
//!
//! Repeating effects (`spin`, `pulse`, `wander`, `float`, `bouncy`)
//! re-schedule themselves from their own completion, so each keeps exactly
//! one animation in flight.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::movement::{Bounce, Float};
use crate::components::sprite::{Attribute, Sprite};
use crate::error::EngineResult;
use crate::navigation::policies::WanderPolicy;
use crate::ops::{movement, spawn, sprite, sprite_mut};
use crate::resources::animations::{AnimationId, AnimationSet, Completion, EntityCallback, TweenSpec};
use crate::resources::grid::SpatialGrid;
use crate::resources::rng::SimRng;
use crate::resources::timers::{Repeat, TimerCallback, Timers};
use crate::resources::worldtime::WorldTime;

/// Schedule an animation of `entity`'s attributes.
pub fn animate(world: &mut World, entity: Entity, spec: TweenSpec) -> EngineResult<AnimationId> {
    world.resource_scope(|world, mut set: Mut<AnimationSet>| {
        let sprite = sprite(world, entity)?;
        Ok(set.schedule(entity, sprite, spec))
    })
}

/// Run a flushed animation's completion against its target.
pub fn run_completion(world: &mut World, entity: Entity, completion: Completion) {
    match completion {
        Completion::None => {}
        Completion::Callback(cb) => cb(world, entity),
        Completion::Destroy => {
            spawn::destroy(world, entity);
        }
        Completion::MoveFinished(then) => movement::finish_move(world, entity, then),
    }
}

/// Abort every abortable animation in flight.
pub fn abort_all(world: &mut World) {
    world.resource_scope(|world, mut set: Mut<AnimationSet>| {
        let mut aborted = 0;
        for anim in set.iter_mut() {
            if !anim.is_abortable() {
                continue;
            }
            if let Some(mut sprite) = world.get_mut::<Sprite>(anim.target) {
                if anim.abort(&mut *sprite) {
                    aborted += 1;
                }
            } else {
                anim.detach();
            }
        }
        if aborted > 0 {
            debug!("aborted {} animations", aborted);
        }
    });
}

/// Destroy `entity` after `time` seconds.
pub fn destruct(world: &mut World, entity: Entity, time: f32) -> EngineResult<AnimationId> {
    sprite_mut(world, entity)?.lifespan = 0.0;
    let spec = TweenSpec::new(time)
        .with(Attribute::Lifespan, time)
        .with_completion(Completion::Destroy);
    animate(world, entity, spec)
}

/// Pixelate and shrink to nothing, then destroy.
pub fn fade(world: &mut World, entity: Entity, time: f32) -> EngineResult<AnimationId> {
    let spec = TweenSpec::new(time)
        .with(Attribute::Pixelated, 100.0)
        .with(Attribute::Size, 0.0)
        .with_completion(Completion::Destroy);
    animate(world, entity, spec)
}

/// One full turn every `time` seconds, `rotations` times or forever.
/// `then` runs after the last rotation.
pub fn spin(world: &mut World, entity: Entity, time: f32, rotations: Option<u32>, then: Option<EntityCallback>) -> EngineResult<()> {
    let angle = {
        let mut s = sprite_mut(world, entity)?;
        s.angle %= 360.0;
        s.angle
    };
    match rotations {
        Some(0) => {
            sprite_mut(world, entity)?.angle = 0.0;
            if let Some(cb) = then {
                cb(world, entity);
            }
        }
        _ => {
            let remaining = rotations.map(|r| r - 1);
            let spec = TweenSpec::new(time)
                .with(Attribute::Angle, angle + 360.0)
                .on_complete(move |world, entity| {
                    if let Err(e) = spin(world, entity, time, remaining, then) {
                        debug!("spin stopped for {:?}: {}", entity, e);
                    }
                });
            animate(world, entity, spec)?;
        }
    }
    Ok(())
}

/// Grow to `size` (twice the current scale when `None`) and back, forever.
pub fn pulse(world: &mut World, entity: Entity, time: f32, size: Option<f32>) -> EngineResult<()> {
    let current = sprite(world, entity)?.scale;
    let target = size.unwrap_or(current * 2.0);
    let spec = TweenSpec::new(time)
        .with(Attribute::Size, target)
        .on_complete(move |world, entity| {
            if let Err(e) = pulse(world, entity, time, Some(current)) {
                debug!("pulse stopped for {:?}: {}", entity, e);
            }
        });
    animate(world, entity, spec)?;
    Ok(())
}

/// Grid units within which a floating sprite counts as back at its origin.
const SETTLED: f32 = 1e-3;

/// Drift up to `distance` cells around the current position, forever.
/// Ignored while the sprite is already moving.
pub fn float(world: &mut World, entity: Entity, distance: f32) -> EngineResult<()> {
    let origin = {
        let mut s = sprite_mut(world, entity)?;
        if s.moving {
            return Ok(());
        }
        s.moving = true;
        s.grid_pos()
    };
    world.entity_mut(entity).insert(Float { origin, distance: distance.abs() });
    float_step(world, entity)
}

/// Away from the origin by a random diagonal, or back to it.
fn float_step(world: &mut World, entity: Entity) -> EngineResult<()> {
    let Some(&Float { origin, distance }) = world.get::<Float>(entity) else {
        return Ok(());
    };
    let (x, y) = sprite(world, entity)?.grid_pos();
    let mut offset = |pos: f32, home: f32| {
        if (pos - home).abs() < SETTLED {
            distance * world.resource_mut::<SimRng>().sign() as f32
        } else {
            home - pos
        }
    };
    let (ox, oy) = (offset(x, origin.0), offset(y, origin.1));
    let duration = sprite(world, entity)?.travel_time(ox.hypot(oy));
    let spec = TweenSpec::new(duration)
        .with(Attribute::X, x + ox)
        .with(Attribute::Y, y + oy)
        .on_complete(|world, entity| {
            if let Err(e) = float_step(world, entity) {
                debug!("float stopped for {:?}: {}", entity, e);
            }
        });
    animate(world, entity, spec)?;
    Ok(())
}

/// Travel diagonally at the sprite's speed, reflecting off the playfield
/// edges, forever. Ignored while the sprite is already moving.
pub fn bouncy(world: &mut World, entity: Entity) -> EngineResult<()> {
    {
        let mut s = sprite_mut(world, entity)?;
        if s.moving {
            return Ok(());
        }
        s.moving = true;
    }
    let (dx, dy) = {
        let mut rng = world.resource_mut::<SimRng>();
        (rng.sign(), rng.sign())
    };
    world.entity_mut(entity).insert(Bounce { dx, dy });
    bounce_step(world, entity)
}

/// Reverse a bouncing sprite along x and/or y. Takes effect from its next
/// leg; a sprite that is not bouncing is left alone.
pub fn bounce(world: &mut World, entity: Entity, x: bool, y: bool) -> EngineResult<()> {
    sprite(world, entity)?;
    if let Some(mut b) = world.get_mut::<Bounce>(entity) {
        b.flip(x, y);
    }
    Ok(())
}

fn bounce_step(world: &mut World, entity: Entity) -> EngineResult<()> {
    let field = {
        let grid = world.resource::<SpatialGrid>();
        (grid.width, grid.height)
    };
    let s = sprite(world, entity)?;
    let (pos, size) = (s.grid_pos(), (s.width(), s.height()));
    let per_cell = s.travel_time(std::f32::consts::SQRT_2);
    let Some(mut b) = world.get_mut::<Bounce>(entity) else {
        return Ok(());
    };
    b.reflect(pos, size, field);
    let (dx, dy) = (b.dx as f32, b.dy as f32);
    let reach = b.reach(pos, size, field);
    let duration = per_cell * reach;
    let spec = TweenSpec::new(duration)
        .with(Attribute::X, pos.0 + reach * dx)
        .with(Attribute::Y, pos.1 + reach * dy)
        .on_complete(|world, entity| {
            if let Err(e) = bounce_step(world, entity) {
                debug!("bounce stopped for {:?}: {}", entity, e);
            }
        });
    animate(world, entity, spec)?;
    Ok(())
}

/// Run `policy` now and again every `interval` seconds.
pub fn wander(world: &mut World, entity: Entity, policy: WanderPolicy, interval: f32) -> EngineResult<()> {
    policy.run(world, entity)?;
    let spec = TweenSpec::new(interval).on_complete(move |world, entity| {
        if let Err(e) = wander(world, entity, policy, interval) {
            debug!("wander stopped for {:?}: {}", entity, e);
        }
    });
    animate(world, entity, spec)?;
    Ok(())
}

/// Run `callback` after `wait` seconds of simulation time.
pub fn schedule_callback(world: &mut World, wait: f32, repeat: Repeat, callback: impl Fn(&mut World) + Send + Sync + 'static) {
    let now = world.get_resource::<WorldTime>().map_or(0.0, |t| t.elapsed);
    let callback: TimerCallback = Arc::new(callback);
    world.resource_mut::<Timers>().schedule(now, wait, repeat, callback);
}
