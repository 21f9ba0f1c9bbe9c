//! Grid movement.
//!
//! A move is an animation of the sprite's `X`/`Y` attributes toward a
//! destination cell that lasts `distance / speed` seconds. When it completes
//! (see [`Completion::MoveFinished`]) [`finish_move`] reverts the actor to
//! idle, runs the caller's callback and continues any [`MoveQueue`].
//!
//! `move_to` does not nest callbacks. It stores the remaining waypoints in a
//! [`MoveQueue`] component and pops one per completed segment, so only one
//! segment per entity is ever in flight.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::actor::{Actor, Direction, LoopCount, IDLE, WALK};
use crate::components::movement::{MoveKind, MoveQueue, Precondition};
use crate::components::sprite::{Attribute, Sprite};
use crate::error::{EngineError, EngineResult};
use crate::ops::actor::{act_if_actor, direction, is_actor, is_alive};
use crate::ops::effects::animate;
use crate::ops::sprite_mut;
use crate::resources::animations::{Completion, EntityCallback, TweenSpec};
use crate::resources::grid::{Cell, SpatialGrid};
use crate::resources::rng::SimRng;

/// Options for [`move_by`].
#[derive(Default)]
pub struct MoveOptions {
    pub precondition: Option<Precondition>,
    /// Runs after the move completes, unless the actor died meanwhile.
    pub then: Option<EntityCallback>,
}

impl MoveOptions {
    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn then(mut self, callback: impl FnOnce(&mut World, Entity) + Send + Sync + 'static) -> Self {
        self.then = Some(Box::new(callback));
        self
    }
}

/// Options for [`move_to`].
#[derive(Default)]
pub struct MoveToOptions {
    /// Probability of giving up before each segment.
    pub pabort: f32,
    /// Runs once the last waypoint is reached instead of going idle.
    pub on_complete: Option<EntityCallback>,
    /// Checked before each segment with [`MoveKind::Waypoint`].
    pub precondition: Option<Precondition>,
}

impl MoveToOptions {
    pub fn with_pabort(mut self, pabort: f32) -> Self {
        self.pabort = pabort;
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(&mut World, Entity) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

/// Step one cell along `vector`; each component is clamped to `-1..=1`.
///
/// Actors face the move and play `walk_<direction>`. A rejected
/// precondition still animates, in place, for the same duration.
pub fn move_by(world: &mut World, entity: Entity, vector: (i32, i32), options: MoveOptions) -> EngineResult<()> {
    let vector = (vector.0.signum(), vector.1.signum());
    step(world, entity, vector, MoveKind::Step, options.precondition, options.then)
}

/// Move along `vector` without clamping. Keyboard movement with more than
/// one space per press and waypoint segments use this.
pub(crate) fn step(
    world: &mut World,
    entity: Entity,
    vector: (i32, i32),
    kind: MoveKind,
    precondition: Option<Precondition>,
    then: Option<EntityCallback>,
) -> EngineResult<()> {
    let Some(sprite) = world.get::<Sprite>(entity) else {
        return Err(EngineError::UnknownEntity(entity));
    };
    if !is_alive(world, entity) {
        return Ok(());
    }
    let here = sprite.pos();
    let duration = sprite.travel_time(((vector.0 * vector.0 + vector.1 * vector.1) as f32).sqrt());
    let abortable = sprite.abortable;

    if is_actor(world, entity) {
        let dir = Direction::from_vector(vector.0, vector.1);
        if let Some(mut actor) = world.get_mut::<Actor>(entity) {
            actor.face(dir);
        }
        act_if_actor(world, entity, &format!("{}_{}", WALK, dir.as_str()), LoopCount::Forever);
    }

    let dest = (here.0 + vector.0, here.1 + vector.1);
    let allowed = precondition.as_ref().is_none_or(|p| p(kind, world, entity, dest));
    let target = if allowed { dest } else { here };
    if !allowed {
        debug!("{:?} move to {:?} rejected", entity, dest);
    }

    sprite_mut(world, entity)?.moving = true;
    let spec = TweenSpec::new(duration)
        .with(Attribute::X, target.0 as f32)
        .with(Attribute::Y, target.1 as f32)
        .with_abortable(abortable)
        .with_completion(Completion::MoveFinished(then));
    animate(world, entity, spec)?;
    Ok(())
}

/// Completion of a single move segment.
pub fn finish_move(world: &mut World, entity: Entity, then: Option<EntityCallback>) {
    match world.get_mut::<Sprite>(entity) {
        Some(mut sprite) => sprite.moving = false,
        None => return,
    }
    if !is_alive(world, entity) {
        world.entity_mut(entity).remove::<MoveQueue>();
        return;
    }
    if let Ok(dir) = direction(world, entity) {
        act_if_actor(world, entity, &format!("{}_{}", IDLE, dir.as_str()), LoopCount::Forever);
    }
    if let Some(cb) = then {
        cb(world, entity);
    }
    if world.get::<MoveQueue>(entity).is_some() {
        advance_queue(world, entity);
    }
}

/// Visit `waypoints` in order. An empty list, an early abort or a blocked
/// waypoint leave the entity idle.
pub fn move_to(world: &mut World, entity: Entity, waypoints: impl IntoIterator<Item = Cell>, options: MoveToOptions) -> EngineResult<()> {
    crate::ops::sprite(world, entity)?;
    let queue = MoveQueue {
        on_complete: options.on_complete,
        pabort: options.pabort,
        precondition: options.precondition,
        ..MoveQueue::new(waypoints)
    };
    if queue.is_empty() {
        act_if_actor(world, entity, IDLE, LoopCount::Forever);
        return Ok(());
    }
    world.entity_mut(entity).insert(queue);
    advance_queue(world, entity);
    Ok(())
}

fn go_idle(world: &mut World, entity: Entity) {
    world.entity_mut(entity).remove::<MoveQueue>();
    act_if_actor(world, entity, IDLE, LoopCount::Forever);
}

/// Schedule the next queued segment, or finish the chain.
fn advance_queue(world: &mut World, entity: Entity) {
    if !is_alive(world, entity) {
        world.entity_mut(entity).remove::<MoveQueue>();
        return;
    }
    let (head, pabort, precondition, done) = {
        let Some(mut queue) = world.get_mut::<MoveQueue>(entity) else {
            return;
        };
        let head = queue.waypoints.pop_front();
        let done = if head.is_none() { queue.on_complete.take() } else { None };
        (head, queue.pabort, queue.precondition.clone(), done)
    };
    let Some(head) = head else {
        world.entity_mut(entity).remove::<MoveQueue>();
        match done {
            Some(cb) => cb(world, entity),
            None => act_if_actor(world, entity, IDLE, LoopCount::Forever),
        }
        return;
    };

    if world.resource_mut::<SimRng>().chance(pabort) {
        debug!("{:?} gave up on its path", entity);
        go_idle(world, entity);
        return;
    }
    if world.resource::<SpatialGrid>().is_blocked(head) {
        debug!("{:?} waypoint {:?} is blocked", entity, head);
        go_idle(world, entity);
        return;
    }
    let Some(here) = world.get::<Sprite>(entity).map(|s| s.pos()) else {
        return;
    };
    let vector = (head.0 - here.0, head.1 - here.1);
    if step(world, entity, vector, MoveKind::Waypoint, precondition, None).is_err() {
        world.entity_mut(entity).remove::<MoveQueue>();
    }
}

/// Drop the remaining waypoints. The segment in flight still completes.
pub fn stop(world: &mut World, entity: Entity) -> EngineResult<()> {
    crate::ops::sprite(world, entity)?;
    world.entity_mut(entity).remove::<MoveQueue>();
    Ok(())
}

/// Movement speed in cells per second; the sign is ignored.
pub fn speed(world: &mut World, entity: Entity, speed: f32) -> EngineResult<()> {
    sprite_mut(world, entity)?.set_speed(speed);
    Ok(())
}

pub fn is_moving(world: &World, entity: Entity) -> bool {
    world.get::<Sprite>(entity).is_some_and(|s| s.moving)
}
