//! Game flow: pause, resume and game over.

use bevy_ecs::prelude::*;
use log::info;

use crate::ops::effects::schedule_callback;
use crate::resources::runstate::RunState;
use crate::resources::timers::Repeat;

/// Default seconds between [`gameover`] and the game actually ending.
pub const GAMEOVER_DELAY: f32 = 0.5;

/// Freeze the simulation after the current tick. No effect once the game
/// is over.
pub fn pause(world: &mut World) {
    if world.get_resource_or_init::<RunState>().pause() {
        info!("game paused");
    }
}

pub fn resume(world: &mut World) {
    let mut state = world.get_resource_or_init::<RunState>();
    if state.is_paused() {
        state.resume();
        info!("game resumed");
    }
}

/// End the game `delay` seconds from now.
pub fn gameover(world: &mut World, delay: f32) {
    schedule_callback(world, delay, Repeat::Once, |world| {
        world.get_resource_or_init::<RunState>().end();
        info!("game over");
    });
}

pub fn is_paused(world: &World) -> bool {
    world.get_resource::<RunState>().is_some_and(|s| s.is_paused())
}

pub fn is_over(world: &World) -> bool {
    world.get_resource::<RunState>().is_some_and(|s| s.is_over())
}
