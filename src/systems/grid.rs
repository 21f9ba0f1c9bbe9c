//! Grid re-registration.

use bevy_ecs::prelude::*;

use crate::components::sprite::{SpawnOrder, Sprite};
use crate::components::tag::Tag;
use crate::resources::grid::SpatialGrid;

/// Rebuild the grid from every sprite's current footprint, in spawn order.
pub fn register_grid(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Sprite, Option<&Tag>, Option<&SpawnOrder>)>,
) {
    grid.clear();
    let mut sprites: Vec<_> = query.iter().collect();
    sprites.sort_by_key(|(e, _, _, order)| SpawnOrder::key(*order, *e));
    for (entity, sprite, tag, _) in sprites {
        let (x, y) = sprite.pos();
        grid.register(entity, tag, (x, y), sprite.width(), sprite.height());
    }
}
