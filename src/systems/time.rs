//! Time update and timed callbacks.
//!
//! [`update_world_time`] updates the shared
//! [`WorldTime`](crate::resources::worldtime::WorldTime) resource once per
//! tick, applying `time_scale` to the provided delta. [`update_timers`] runs
//! the callbacks that came due and [`update_scoreboards`] steps timer
//! scoreboards.
use bevy_ecs::prelude::*;
use log::warn;

use crate::ops::score;
use crate::resources::scoreboard::Scoreboard;
use crate::resources::timers::Timers;
use crate::resources::worldtime::WorldTime;

/// Record a tick of `dt` unscaled seconds. Negative deltas count as zero.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let scaled_dt = dt.max(0.0) * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.ticks += 1;
}

/// Run every timer due at the current simulation time.
pub fn update_timers(world: &mut World) {
    let now = world.resource::<WorldTime>().elapsed;
    let due = world.resource_mut::<Timers>().take_due(now);
    for callback in due {
        callback(world);
    }
}

/// Step timer scoreboards by the tick delta, redraw the ones that changed
/// and run the goal callbacks of those that expired.
pub fn update_scoreboards(world: &mut World) {
    let dt = world.resource::<WorldTime>().delta;
    let update = world.resource_mut::<Scoreboard>().advance(dt);
    for corner in update.changed {
        if let Err(e) = score::refresh(world, corner) {
            warn!("unable to redraw {:?} scoreboard: {}", corner, e);
        }
    }
    for callback in update.expired {
        callback(world);
    }
}
