//! Discrete lines and the line-of-sight movement limiter.

use crate::resources::grid::{footprint, Cell, SpatialGrid};

/// Cells on the Bresenham line from `start` to `end`, both included.
pub fn bresenham(start: Cell, end: Cell) -> Vec<Cell> {
    let (mut x, mut y) = start;
    let dx = (end.0 - x).abs();
    let dy = -(end.1 - y).abs();
    let sx = if x < end.0 { 1 } else { -1 };
    let sy = if y < end.1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut out = Vec::with_capacity((dx - dy + 1) as usize);
    loop {
        out.push((x, y));
        if (x, y) == end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    out
}

/// Furthest cell on the line from `start` toward `end` that a sprite of
/// `width` x `height` cells can reach.
///
/// Each step is checked against walls and obstacles: if the footprint at the
/// step would overlap one, the previous cell is returned; if one lies in the
/// row right under the footprint, the step itself is returned (the sprite
/// lands on it). With `skip_up` only downward steps are checked, so a jump
/// passes through platforms on the way up.
pub fn max_distance(grid: &SpatialGrid, start: Cell, end: Cell, width: f32, height: f32, skip_up: bool) -> Cell {
    let w = (width.ceil() as i32).max(1);
    let h = (height.ceil() as i32).max(1);
    let mut prev = start;
    for p in bresenham(start, end).into_iter().skip(1) {
        let dy = p.1 - prev.1;
        if !skip_up || dy > 0 {
            if footprint(p, width, height).any(|c| grid.is_blocked(c)) {
                return prev;
            }
            if (0..w).any(|dx| grid.is_blocked((p.0 + dx, p.1 + h))) {
                return p;
            }
        }
        prev = p;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tag::Tag;
    use bevy_ecs::world::World;

    #[test]
    fn bresenham_covers_endpoints() {
        assert_eq!(bresenham((0, 0), (3, 0)), vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(bresenham((0, 0), (2, 2)), vec![(0, 0), (1, 1), (2, 2)]);
        let line = bresenham((4, 1), (0, 3));
        assert_eq!(line.first(), Some(&(4, 1)));
        assert_eq!(line.last(), Some(&(0, 3)));
        assert_eq!(line.len(), 5);
        assert_eq!(bresenham((2, 2), (2, 2)), vec![(2, 2)]);
    }

    #[test]
    fn fall_stops_on_platform() {
        let mut world = World::new();
        let mut grid = SpatialGrid::new(500.0, 500.0, 50.0);
        let e = world.spawn_empty().id();
        grid.register(e, Some(&Tag::new(Tag::OBSTACLE)), (2, 6), 1.0, 1.0);
        assert_eq!(max_distance(&grid, (2, 0), (2, 9), 1.0, 1.0, true), (2, 5));
        assert_eq!(max_distance(&grid, (4, 0), (4, 9), 1.0, 1.0, true), (4, 9));
    }

    #[test]
    fn skip_up_passes_through_from_below() {
        let mut world = World::new();
        let mut grid = SpatialGrid::new(500.0, 500.0, 50.0);
        let e = world.spawn_empty().id();
        grid.register(e, Some(&Tag::new(Tag::OBSTACLE)), (1, 3), 1.0, 1.0);
        assert_eq!(max_distance(&grid, (1, 6), (1, 1), 1.0, 1.0, true), (1, 1));
        assert_eq!(max_distance(&grid, (1, 6), (1, 1), 1.0, 1.0, false), (1, 4));
    }
}
