//! A* search over the spatial grid.
//!
//! Nodes are cells, every step costs 1 and the heuristic is Euclidean
//! distance. Neighbours are the four orthogonal cells that are visible and
//! hold no wall.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::resources::grid::{distance, Cell, SpatialGrid};

#[derive(Clone, Copy, Debug)]
struct Open {
    estimate: f32,
    cost: u32,
    cell: Cell,
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Open {
    // Reversed so the max-heap pops the lowest estimate first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| self.cost.cmp(&other.cost))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

/// Passable orthogonal neighbours of `cell`, in up, down, left, right order.
pub fn neighbors(grid: &SpatialGrid, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
    let (x, y) = cell;
    [(x, y - 1), (x, y + 1), (x - 1, y), (x + 1, y)]
        .into_iter()
        .filter(move |&c| grid.visible(c) && !grid.is_wall(c))
}

/// Shortest path from `start` to `goal`, both included. `None` when the goal
/// cannot be reached.
pub fn astar(grid: &SpatialGrid, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut open = BinaryHeap::new();
    let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
    let mut best: FxHashMap<Cell, u32> = FxHashMap::default();
    let mut closed: FxHashSet<Cell> = FxHashSet::default();

    best.insert(start, 0);
    open.push(Open {
        estimate: distance(start, goal),
        cost: 0,
        cell: start,
    });

    while let Some(Open { cost, cell, .. }) = open.pop() {
        if cell == goal {
            let mut path = vec![goal];
            let mut cur = goal;
            while let Some(&prev) = came_from.get(&cur) {
                path.push(prev);
                cur = prev;
            }
            path.reverse();
            return Some(path);
        }
        if !closed.insert(cell) {
            continue;
        }
        for next in neighbors(grid, cell) {
            let next_cost = cost + 1;
            if best.get(&next).is_some_and(|&c| c <= next_cost) {
                continue;
            }
            best.insert(next, next_cost);
            came_from.insert(next, cell);
            open.push(Open {
                estimate: next_cost as f32 + distance(next, goal),
                cost: next_cost,
                cell: next,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tag::Tag;
    use bevy_ecs::world::World;

    fn walled(cells: &[Cell]) -> SpatialGrid {
        let mut world = World::new();
        let mut grid = SpatialGrid::new(250.0, 250.0, 50.0);
        for &c in cells {
            let e = world.spawn_empty().id();
            grid.register(e, Some(&Tag::wall()), c, 1.0, 1.0);
        }
        grid
    }

    #[test]
    fn straight_path_includes_both_ends() {
        let grid = walled(&[]);
        let path = astar(&grid, (0, 0), (3, 0)).unwrap();
        assert_eq!(path, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn path_goes_around_walls() {
        let grid = walled(&[(1, 0), (1, 1), (1, 2), (1, 3)]);
        let path = astar(&grid, (0, 0), (2, 0)).unwrap();
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(2, 0)));
        assert_eq!(path.len(), 11);
        assert!(path.iter().all(|&c| !grid.is_wall(c)));
        assert!(path.windows(2).all(|w| distance(w[0], w[1]) == 1.0));
    }

    #[test]
    fn enclosed_start_has_no_path() {
        let grid = walled(&[(1, 2), (3, 2), (2, 1), (2, 3)]);
        assert!(astar(&grid, (2, 2), (0, 0)).is_none());
    }
}
