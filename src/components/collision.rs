use std::sync::Arc;

use bevy_ecs::prelude::*;

/// `(world, self, other)`, run when the two sprites overlap.
pub type CollisionCallback = Arc<dyn Fn(&mut World, Entity, Entity) + Send + Sync>;

pub struct CollisionRule {
    pub other: Entity,
    pub callback: CollisionCallback,
}

/// Collision callbacks registered on a sprite, at most one per other entity.
///
/// Checked every tick by [`collision_detector`](crate::systems::collision::collision_detector);
/// rules whose other entity no longer exists are dropped.
#[derive(Component, Default)]
pub struct CollisionRules {
    pub rules: Vec<CollisionRule>,
}

impl CollisionRules {
    /// Register `callback` against `other`, replacing an earlier rule for it.
    pub fn add(&mut self, other: Entity, callback: CollisionCallback) {
        self.rules.retain(|r| r.other != other);
        self.rules.push(CollisionRule { other, callback });
    }

    pub fn callbacks_for(&self, other: Entity) -> impl Iterator<Item = CollisionCallback> + '_ {
        self.rules
            .iter()
            .filter(move |r| r.other == other)
            .map(|r| r.callback.clone())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
