//! Spatial grid resource.
//!
//! [`SpatialGrid`] maps integer cells to the entities whose footprint covers
//! them. It is rebuilt from scratch every tick by
//! [`register_grid`](crate::systems::grid::register_grid); spawners also
//! register new sprites immediately so that queries issued in the same tick
//! already see them.
//!
//! Queries return slices: an empty slice means the cell is free, a slice of
//! length one holds the single occupant, longer slices hold every occupant in
//! registration order.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::tag::Tag;
use crate::resources::rng::SimRng;

/// Sampling budget of [`SpatialGrid::random_free_position`].
const MAX_SAMPLES_PER_CELL: usize = 16;
const MIN_SAMPLES: usize = 64;

/// Integer grid coordinate `(x, y)`.
pub type Cell = (i32, i32);

/// One entity registered in a cell, together with its tag at registration time.
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub entity: Entity,
    pub tag: Option<String>,
}

/// Cells covered by a `width` x `height` footprint (grid units) whose top-left
/// cell is `origin`. Dimensions are rounded up; a degenerate footprint still
/// covers its origin.
pub fn footprint(origin: Cell, width: f32, height: f32) -> impl Iterator<Item = Cell> {
    let w = (width.ceil() as i32).max(1);
    let h = (height.ceil() as i32).max(1);
    (0..h).flat_map(move |dy| (0..w).map(move |dx| (origin.0 + dx, origin.1 + dy)))
}

/// Euclidean distance between two cells.
pub fn distance(a: Cell, b: Cell) -> f32 {
    let dx = (a.0 - b.0) as f32;
    let dy = (a.1 - b.1) as f32;
    (dx * dx + dy * dy).sqrt()
}

#[derive(Resource, Debug, Clone)]
pub struct SpatialGrid {
    cells: FxHashMap<Cell, SmallVec<[Occupant; 2]>>,
    /// Playfield width in grid units.
    pub width: f32,
    /// Playfield height in grid units.
    pub height: f32,
    /// Side of one cell in sub-grid units.
    pub grid_size: f32,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        SpatialGrid::new(800.0, 800.0, 50.0)
    }
}

impl SpatialGrid {
    /// Build an empty grid for a playfield of `width_px` x `height_px`.
    pub fn new(width_px: f32, height_px: f32, grid_size: f32) -> Self {
        let grid_size = grid_size.max(1.0);
        SpatialGrid {
            cells: FxHashMap::default(),
            width: width_px / grid_size,
            height: height_px / grid_size,
            grid_size,
        }
    }

    /// Number of whole columns.
    pub fn columns(&self) -> i32 {
        self.width.floor() as i32
    }

    /// Number of whole rows.
    pub fn rows(&self) -> i32 {
        self.height.floor() as i32
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Append `entity` to every cell of the footprint.
    pub fn register(&mut self, entity: Entity, tag: Option<&Tag>, origin: Cell, width: f32, height: f32) {
        for cell in footprint(origin, width, height) {
            self.register_cell(cell, entity, tag);
        }
    }

    pub fn register_cell(&mut self, cell: Cell, entity: Entity, tag: Option<&Tag>) {
        self.cells.entry(cell).or_default().push(Occupant {
            entity,
            tag: tag.map(|t| t.0.clone()),
        });
    }

    /// Every occupant of `cell`, possibly empty.
    pub fn at(&self, cell: Cell) -> &[Occupant] {
        self.cells.get(&cell).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn entities_at(&self, cell: Cell) -> impl Iterator<Item = Entity> + '_ {
        self.at(cell).iter().map(|o| o.entity)
    }

    pub fn is_empty_at(&self, cell: Cell) -> bool {
        self.at(cell).is_empty()
    }

    pub fn has_tag_at(&self, cell: Cell, tag: &str) -> bool {
        self.at(cell).iter().any(|o| o.tag.as_deref() == Some(tag))
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.has_tag_at(cell, Tag::WALL)
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.has_tag_at(cell, Tag::OBSTACLE)
    }

    /// Wall or obstacle.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.is_wall(cell) || self.is_obstacle(cell)
    }

    /// Bounds check only, there is no occlusion.
    pub fn visible(&self, cell: Cell) -> bool {
        let (x, y) = (cell.0 as f32, cell.1 as f32);
        x >= 0.0 && y >= 0.0 && x < self.width && y < self.height
    }

    /// Number of cells with at least one occupant.
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|v| !v.is_empty()).count()
    }

    /// Sample a free in-bounds cell, leaving `x_padding`/`y_padding` cells
    /// at the right and bottom edges.
    ///
    /// Best effort: when the board holds at least as many sprites as cells
    /// the first sample is returned as is, and after enough failed attempts
    /// the last sample is returned even if occupied.
    pub fn random_free_position(&self, rng: &mut SimRng, x_padding: f32, y_padding: f32, sprite_count: usize) -> Cell {
        let cols = ((self.width - x_padding.ceil()).floor() as i32).max(1);
        let rows = ((self.height - y_padding.ceil()).floor() as i32).max(1);
        let total = (cols as usize) * (rows as usize);
        let attempts = (sprite_count.max(total) * MAX_SAMPLES_PER_CELL).max(MIN_SAMPLES);

        let mut sample = (0, 0);
        for _ in 0..attempts {
            sample = (rng.i32(0..cols), rng.i32(0..rows));
            if sprite_count >= total || self.is_empty_at(sample) {
                return sample;
            }
        }
        log::debug!("random_free_position fell back to {:?}", sample);
        sample
    }

    /// Free, visible cells in row-major order.
    pub fn free_cells(&self) -> Vec<Cell> {
        let mut out = Vec::new();
        for y in 0..self.rows() {
            for x in 0..self.columns() {
                if self.is_empty_at((x, y)) {
                    out.push((x, y));
                }
            }
        }
        out
    }
}
