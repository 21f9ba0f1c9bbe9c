//! Collision notifications.
//!
//! [`collision_detector`](crate::systems::collision::collision_detector)
//! triggers a [`CollisionEvent`] for every overlapping pair that has a
//! registered rule. [`on_collision`] runs the matching callbacks.
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use crate::components::collision::CollisionRules;

/// `a` owns the rule, `b` is the sprite it collided with.
#[derive(Event, Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub a: Entity,
    pub b: Entity,
}

/// Queue every callback `a` registered for `b`.
///
/// Callbacks need the whole world, so they run as queued commands once the
/// observer returns.
pub fn on_collision(trigger: On<CollisionEvent>, rules: Query<&CollisionRules>, mut commands: Commands) {
    let a = trigger.event().a;
    let b = trigger.event().b;
    let Ok(rules) = rules.get(a) else {
        return;
    };
    for callback in rules.callbacks_for(b) {
        commands.queue(move |world: &mut World| callback(world, a, b));
    }
}
