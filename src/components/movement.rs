//! Movement components.
//!
//! - [`MoveQueue`] – waypoints still to visit, popped one segment at a time
//! - [`KeyMover`] – keyboard scheme bound through [`keys`](crate::ops::input::keys)
//! - [`Precondition`] – caller-supplied gate on a proposed destination
//! - [`Float`], [`Bounce`] – state of the self-repeating drift effects

use std::collections::VecDeque;
use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::resources::animations::EntityCallback;
use crate::resources::grid::Cell;

/// Which kind of move a [`Precondition`] is asked about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// A single-cell step from [`move_by`](crate::ops::movement::move_by).
    Step,
    /// A waypoint segment from [`move_to`](crate::ops::movement::move_to).
    Waypoint,
}

/// `(kind, world, entity, destination) -> allowed`.
pub type Precondition = Arc<dyn Fn(MoveKind, &World, Entity, Cell) -> bool + Send + Sync>;

/// Remaining waypoints of a `move_to` chain. Only one segment is ever in
/// flight; the next is scheduled when the current one completes.
#[derive(Component, Default)]
pub struct MoveQueue {
    pub waypoints: VecDeque<Cell>,
    /// Runs once the last waypoint is reached.
    pub on_complete: Option<EntityCallback>,
    /// Probability of giving up before each segment.
    pub pabort: f32,
    pub precondition: Option<Precondition>,
}

impl MoveQueue {
    pub fn new(waypoints: impl IntoIterator<Item = Cell>) -> Self {
        MoveQueue {
            waypoints: waypoints.into_iter().collect(),
            on_complete: None,
            pabort: 0.0,
            precondition: None,
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

impl std::fmt::Debug for MoveQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveQueue")
            .field("waypoints", &self.waypoints)
            .field("on_complete", &self.on_complete.is_some())
            .field("pabort", &self.pabort)
            .field("precondition", &self.precondition.is_some())
            .finish()
    }
}

/// Drift around `origin` by `distance` cells per axis, returning to it
/// every other step.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Float {
    /// Grid units.
    pub origin: (f32, f32),
    pub distance: f32,
}

/// Diagonal travel that reflects off the playfield edges. Each component
/// is `1` or `-1`.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounce {
    pub dx: i32,
    pub dy: i32,
}

impl Bounce {
    pub fn flip(&mut self, x: bool, y: bool) {
        if x {
            self.dx = -self.dx;
        }
        if y {
            self.dy = -self.dy;
        }
    }

    /// Reflect off whichever edge the sprite at `(x, y)` of size `w` x `h`
    /// is heading into, horizontal edges first. One axis per call.
    pub fn reflect(&mut self, (x, y): (f32, f32), (w, h): (f32, f32), (width, height): (f32, f32)) {
        if (x + w >= width && self.dx > 0) || (x <= 0.0 && self.dx < 0) {
            self.dx = -self.dx;
        } else if (y + h >= height && self.dy > 0) || (y <= 0.0 && self.dy < 0) {
            self.dy = -self.dy;
        }
    }

    /// Cells to travel diagonally before the next edge is hit.
    pub fn reach(&self, (x, y): (f32, f32), (w, h): (f32, f32), (width, height): (f32, f32)) -> f32 {
        let x_room = if self.dx > 0 { width - (x + w) } else { x };
        let y_room = if self.dy > 0 { height - (y + h) } else { y };
        x_room.min(y_room).max(0.0)
    }
}

/// Keys mapped to movement directions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyScheme {
    pub right: Option<String>,
    pub left: Option<String>,
    pub up: Option<String>,
    pub down: Option<String>,
}

impl Default for KeyScheme {
    fn default() -> Self {
        KeyScheme {
            right: Some("right".into()),
            left: Some("left".into()),
            up: Some("up".into()),
            down: Some("down".into()),
        }
    }
}

impl KeyScheme {
    pub fn wasd() -> Self {
        KeyScheme {
            right: Some("d".into()),
            left: Some("a".into()),
            up: Some("w".into()),
            down: Some("s".into()),
        }
    }

    /// `(key, unit vector)` for every bound key.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, (i32, i32))> {
        [
            (self.right.as_deref(), (1, 0)),
            (self.left.as_deref(), (-1, 0)),
            (self.up.as_deref(), (0, -1)),
            (self.down.as_deref(), (0, 1)),
        ]
        .into_iter()
        .filter_map(|(k, v)| k.map(|k| (k, v)))
    }
}

/// Marks an entity driven by keyboard bindings.
#[derive(Component, Clone)]
pub struct KeyMover {
    pub scheme: KeyScheme,
    pub spaces: i32,
    pub precondition: Option<Precondition>,
}

impl KeyMover {
    pub fn new(scheme: KeyScheme) -> Self {
        KeyMover {
            scheme,
            spaces: 1,
            precondition: None,
        }
    }

    pub fn with_spaces(mut self, spaces: i32) -> Self {
        self.spaces = spaces;
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }
}

impl Default for KeyMover {
    fn default() -> Self {
        KeyMover::new(KeyScheme::default())
    }
}

impl std::fmt::Debug for KeyMover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMover")
            .field("scheme", &self.scheme)
            .field("spaces", &self.spaces)
            .field("precondition", &self.precondition.is_some())
            .finish()
    }
}
