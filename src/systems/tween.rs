//! Animation scheduling systems.
//!
//! - [`advance_animations`] – interpolate every live animation by the tick delta
//! - [`flush_animations`] – remove finished animations and run their completions
//!
//! Completions run after every animation has advanced, so a callback that
//! schedules a new animation never sees it advanced in the same tick.

use bevy_ecs::prelude::*;

use crate::components::sprite::Sprite;
use crate::ops::effects::run_completion;
use crate::resources::animations::AnimationSet;
use crate::resources::worldtime::WorldTime;

/// Advance each animation against its target sprite. Animations whose
/// target is gone finish without writing anything.
pub fn advance_animations(time: Res<WorldTime>, mut set: ResMut<AnimationSet>, mut sprites: Query<&mut Sprite>) {
    let delta_ms = time.delta_ms();
    for anim in set.iter_mut() {
        if anim.is_finished() {
            continue;
        }
        match sprites.get_mut(anim.target) {
            Ok(mut sprite) => anim.advance(&mut *sprite, delta_ms),
            Err(_) => anim.detach(),
        }
    }
}

/// Run completions of finished animations in scheduling order. Completions
/// of animations whose target no longer exists are dropped.
pub fn flush_animations(world: &mut World) {
    let finished = world.resource_mut::<AnimationSet>().take_finished();
    for mut anim in finished {
        if world.get::<Sprite>(anim.target).is_none() {
            continue;
        }
        let completion = anim.take_completion();
        run_completion(world, anim.target, completion);
    }
}
