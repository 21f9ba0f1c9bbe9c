//! Sprite component: geometry, visual handle and tweenable attributes.
//!
//! A sprite keeps its geometry in a virtual rectangle measured in sub-grid
//! units (pixels). The grid position exposed to game code is always the floor
//! division of that rectangle by the grid size, while animations move the
//! rectangle smoothly between cells.

use bevy_ecs::prelude::{Component, Entity, Resource};

use crate::resources::animations::Animatable;
use crate::resources::grid::{footprint, Cell};

/// Default movement speed in cells per second.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Axis-aligned rectangle in sub-grid units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl VirtRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &VirtRect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 128, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const ORANGE: Rgb = Rgb(255, 165, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Circle,
    Ellipse,
}

/// What the external renderer should draw for a sprite.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    /// An image resolved through the asset store, addressed by key.
    Image(String),
    Shape {
        kind: ShapeKind,
        color: Rgb,
        /// Outline thickness in pixels; 0 means filled.
        outline: u32,
    },
    Text {
        text: String,
        color: Rgb,
    },
}

/// Sprite attributes that animations can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Horizontal position in (fractional) grid units.
    X,
    /// Vertical position in (fractional) grid units.
    Y,
    /// Uniform scale factor applied to the base footprint.
    Size,
    /// Rotation in degrees.
    Angle,
    /// Seconds lived since a self-destruct was armed.
    Lifespan,
    /// Pixelation strength used by the fade effect.
    Pixelated,
}

/// Place of a sprite in the spawn sequence. Entity ids are recycled after a
/// despawn; this number never is.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnOrder(pub u64);

impl SpawnOrder {
    /// Sort key for sprites that may lack a [`SpawnOrder`]; those sort last.
    pub fn key(order: Option<&SpawnOrder>, entity: Entity) -> (u64, Entity) {
        (order.map_or(u64::MAX, |o| o.0), entity)
    }
}

/// Hands out [`SpawnOrder`]s.
#[derive(Resource, Debug, Default)]
pub struct SpawnSequence {
    next: u64,
}

impl SpawnSequence {
    pub fn next(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next);
        self.next += 1;
        order
    }
}

#[derive(Component, Debug, Clone)]
pub struct Sprite {
    pub rect: VirtRect,
    /// Unscaled width/height in sub-grid units.
    pub base_w: f32,
    pub base_h: f32,
    pub grid_size: f32,
    pub scale: f32,
    pub angle: f32,
    pub visual: Visual,
    /// Cells per second.
    pub move_speed: f32,
    pub moving: bool,
    /// Whether this sprite's movements yield to the global abort.
    pub abortable: bool,
    /// Scales the gravity time bias.
    pub mass: f32,
    pub lifespan: f32,
    pub pixelated: f32,
    /// Last click position in grid units.
    pub event_pos: Option<(f32, f32)>,
}

impl Sprite {
    pub fn new(visual: Visual, rect: VirtRect, grid_size: f32) -> Self {
        Sprite {
            rect,
            base_w: rect.w,
            base_h: rect.h,
            grid_size: grid_size.max(1.0),
            scale: 1.0,
            angle: 0.0,
            visual,
            move_speed: DEFAULT_SPEED,
            moving: false,
            abortable: false,
            mass: 1.0,
            lifespan: -1.0,
            pixelated: 0.0,
            event_pos: None,
        }
    }

    pub fn with_abortable(mut self, abortable: bool) -> Self {
        self.abortable = abortable;
        self
    }

    /// Grid column of the top-left corner.
    pub fn x(&self) -> i32 {
        (self.rect.x / self.grid_size).floor() as i32
    }

    /// Grid row of the top-left corner.
    pub fn y(&self) -> i32 {
        (self.rect.y / self.grid_size).floor() as i32
    }

    pub fn pos(&self) -> Cell {
        (self.x(), self.y())
    }

    /// Continuous position in grid units.
    pub fn grid_pos(&self) -> (f32, f32) {
        (self.rect.x / self.grid_size, self.rect.y / self.grid_size)
    }

    pub fn set_x(&mut self, value: f32) {
        self.rect.x = value * self.grid_size;
    }

    pub fn set_y(&mut self, value: f32) {
        self.rect.y = value * self.grid_size;
    }

    pub fn set_pos(&mut self, x: f32, y: f32) {
        self.set_x(x);
        self.set_y(y);
    }

    /// Width in grid units.
    pub fn width(&self) -> f32 {
        self.rect.w / self.grid_size
    }

    /// Height in grid units.
    pub fn height(&self) -> f32 {
        self.rect.h / self.grid_size
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.rect.x + self.rect.w / 2.0) / self.grid_size,
            (self.rect.y + self.rect.h / 2.0) / self.grid_size,
        )
    }

    pub fn set_size(&mut self, value: f32) {
        self.scale = value.max(0.0);
        self.rect.w = self.base_w * self.scale;
        self.rect.h = self.base_h * self.scale;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.move_speed = speed.abs();
    }

    /// Every cell covered by this sprite's footprint.
    pub fn footprint(&self) -> impl Iterator<Item = Cell> + use<> {
        footprint(self.pos(), self.width(), self.height())
    }

    /// Seconds needed to travel `distance` cells at the current speed.
    pub fn travel_time(&self, distance: f32) -> f32 {
        if self.move_speed <= f32::EPSILON {
            return 0.0;
        }
        distance.abs() / self.move_speed
    }
}

impl Animatable for Sprite {
    fn attribute(&self, attribute: Attribute) -> f32 {
        match attribute {
            Attribute::X => self.rect.x / self.grid_size,
            Attribute::Y => self.rect.y / self.grid_size,
            Attribute::Size => self.scale,
            Attribute::Angle => self.angle,
            Attribute::Lifespan => self.lifespan,
            Attribute::Pixelated => self.pixelated,
        }
    }

    fn set_attribute(&mut self, attribute: Attribute, value: f32) {
        match attribute {
            Attribute::X => self.set_x(value),
            Attribute::Y => self.set_y(value),
            Attribute::Size => self.set_size(value),
            Attribute::Angle => self.angle = value,
            Attribute::Lifespan => self.lifespan = value,
            Attribute::Pixelated => self.pixelated = value,
        }
    }

    fn mass(&self) -> f32 {
        self.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn square(x: f32, y: f32, cells: f32) -> Sprite {
        Sprite::new(
            Visual::Image("box".into()),
            VirtRect::new(x * 50.0, y * 50.0, cells * 50.0, cells * 50.0),
            50.0,
        )
    }

    #[test]
    fn grid_position_is_floor_of_virtual_rect() {
        let mut s = square(0.0, 0.0, 1.0);
        s.rect.x = 74.0;
        s.rect.y = 149.9;
        assert_eq!(s.pos(), (1, 2));
        s.rect.x = 100.0;
        assert_eq!(s.x(), 2);
    }

    #[test]
    fn setters_write_sub_grid_units() {
        let mut s = square(0.0, 0.0, 1.0);
        s.set_pos(1.5, 3.0);
        assert!(approx_eq(s.rect.x, 75.0));
        assert!(approx_eq(s.rect.y, 150.0));
        assert!(approx_eq(s.attribute(Attribute::X), 1.5));
        assert_eq!(s.pos(), (1, 3));
    }

    #[test]
    fn size_scales_footprint() {
        let mut s = square(2.0, 2.0, 1.0);
        s.set_size(2.0);
        assert!(approx_eq(s.width(), 2.0));
        let cells: Vec<_> = s.footprint().collect();
        assert_eq!(cells, vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
        s.set_size(-1.0);
        assert!(approx_eq(s.rect.w, 0.0));
    }

    #[test]
    fn travel_time_uses_cells_per_second() {
        let mut s = square(0.0, 0.0, 1.0);
        s.set_speed(-4.0);
        assert!(approx_eq(s.move_speed, 4.0));
        assert!(approx_eq(s.travel_time(2.0), 0.5));
    }

    #[test]
    fn rect_overlap_excludes_touching_edges() {
        let a = VirtRect::new(0.0, 0.0, 50.0, 50.0);
        let b = VirtRect::new(50.0, 0.0, 50.0, 50.0);
        let c = VirtRect::new(25.0, 25.0, 50.0, 50.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.contains_point(49.0, 0.0));
        assert!(!a.contains_point(50.0, 0.0));
    }
}
