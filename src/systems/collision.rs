use bevy_ecs::prelude::*;

use crate::components::collision::CollisionRules;
use crate::components::sprite::{SpawnOrder, Sprite};
use crate::events::collision::CollisionEvent;

/// Trigger a [`CollisionEvent`] for every rule whose sprites overlap.
/// Rules pointing at destroyed sprites are dropped. Events fire in the
/// spawn order of the rule owners.
pub fn collision_detector(
    mut rules: Query<(Entity, &mut CollisionRules, &Sprite, Option<&SpawnOrder>)>,
    sprites: Query<&Sprite>,
    mut commands: Commands,
) {
    let mut pairs: Vec<((u64, Entity), Entity)> = Vec::new();
    for (entity, mut entity_rules, sprite, order) in rules.iter_mut() {
        let key = SpawnOrder::key(order, entity);
        entity_rules.rules.retain(|r| sprites.contains(r.other));
        for rule in &entity_rules.rules {
            if let Ok(other) = sprites.get(rule.other) {
                if sprite.rect.overlaps(&other.rect) {
                    pairs.push((key, rule.other));
                }
            }
        }
    }
    pairs.sort();
    for ((_, a), b) in pairs {
        commands.trigger(CollisionEvent { a, b });
    }
}
