//! Corner scoreboards.
//!
//! Up to one [`Board`] per [`Corner`]. Accumulating and value boards
//! change only when scored; timer boards step once per second of
//! simulation time through [`Scoreboard::advance`] and fire their goal
//! callback once when the goal is reached.
//!
//! Each board is shown by a text sprite that
//! [`ops::score`](crate::ops::score) keeps in sync with its label.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::sprite::Rgb;
use crate::resources::timers::TimerCallback;

/// Scores beyond this magnitude are rejected and count as 0.
pub const MAX_SCORE_STEP: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Corner {
    #[default]
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl Corner {
    /// Anchor of the label in grid units on a `width` x `height` field.
    /// Right corners anchor the label's right edge.
    pub fn anchor(self, width: f32, height: f32) -> (f32, f32) {
        match self {
            Corner::UpperLeft => (0.5, 0.5),
            Corner::UpperRight => (width - 0.5, 0.5),
            Corner::LowerLeft => (0.5, height - 1.0),
            Corner::LowerRight => (width - 0.5, height - 1.0),
        }
    }

    pub fn is_right(self) -> bool {
        matches!(self, Corner::UpperRight | Corner::LowerRight)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScoreMode {
    /// Scoring adds to the value.
    Accumulate,
    /// Scoring replaces the value.
    Value,
    /// The value moves by `step` every second until it reaches `goal`.
    Timer { step: f64, goal: f64 },
}

impl ScoreMode {
    /// Counts down from the initial value to zero.
    pub fn countdown() -> Self {
        ScoreMode::Timer { step: -1.0, goal: 0.0 }
    }

    /// Counts up from the initial value to `goal`.
    pub fn count_up(goal: f64) -> Self {
        ScoreMode::Timer { step: 1.0, goal }
    }
}

pub struct Board {
    pub value: f64,
    pub mode: ScoreMode,
    pub prefix: Option<String>,
    pub color: Rgb,
    /// Font height in cells.
    pub size: f32,
    /// Text sprite currently showing the board.
    pub sprite: Option<Entity>,
    on_goal: Option<TimerCallback>,
    /// Seconds accumulated toward the next timer step.
    carry: f32,
    expired: bool,
}

impl Board {
    pub fn new(value: f64, mode: ScoreMode) -> Self {
        Board {
            value,
            mode,
            prefix: None,
            color: Rgb(25, 25, 25),
            size: 0.75,
            sprite: None,
            on_goal: None,
            carry: 0.0,
            expired: false,
        }
    }

    pub fn with_callback(mut self, callback: Option<TimerCallback>) -> Self {
        self.on_goal = callback;
        self
    }

    /// A timer board whose goal was reached.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Apply a scored value. Timer boards ignore it.
    pub fn score(&mut self, value: f64) {
        match self.mode {
            ScoreMode::Accumulate => self.value += value,
            ScoreMode::Value => self.value = value,
            ScoreMode::Timer { .. } => {}
        }
    }

    /// Text shown for this board. Timers read as `HH:MM:SS`.
    pub fn label(&self) -> String {
        let body = match self.mode {
            ScoreMode::Timer { .. } => clock(self.value),
            _ => self.value.to_string(),
        };
        match &self.prefix {
            Some(prefix) => format!("{} {}", prefix, body),
            None => body,
        }
    }

    /// Step a timer board by `dt` seconds. Returns whether the value
    /// changed and the goal callback if the goal was just reached.
    fn advance(&mut self, dt: f32) -> (bool, Option<TimerCallback>) {
        let ScoreMode::Timer { step, goal } = self.mode else {
            return (false, None);
        };
        if self.expired {
            return (false, None);
        }
        self.carry += dt.max(0.0);
        let mut changed = false;
        while self.carry >= 1.0 {
            self.carry -= 1.0;
            self.value += step;
            changed = true;
            let reached = (step > 0.0 && self.value >= goal) || (step < 0.0 && self.value <= goal);
            if reached {
                self.expired = true;
                return (changed, self.on_goal.clone());
            }
        }
        (changed, None)
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("value", &self.value)
            .field("mode", &self.mode)
            .field("prefix", &self.prefix)
            .field("sprite", &self.sprite)
            .field("expired", &self.expired)
            .finish()
    }
}

/// Whole seconds as `HH:MM:SS`; negative values read as zero.
pub fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", (total / 3600) % 24, (total / 60) % 60, total % 60)
}

/// Outcome of one [`Scoreboard::advance`].
#[derive(Default)]
pub struct TimerUpdate {
    /// Boards whose value moved.
    pub changed: Vec<Corner>,
    /// Goal callbacks to run, in corner order.
    pub expired: Vec<TimerCallback>,
}

#[derive(Resource, Debug, Default)]
pub struct Scoreboard {
    boards: FxHashMap<Corner, Board>,
}

impl Scoreboard {
    pub fn get(&self, corner: Corner) -> Option<&Board> {
        self.boards.get(&corner)
    }

    pub fn get_mut(&mut self, corner: Corner) -> Option<&mut Board> {
        self.boards.get_mut(&corner)
    }

    pub fn value(&self, corner: Corner) -> Option<f64> {
        self.get(corner).map(|b| b.value)
    }

    pub fn insert(&mut self, corner: Corner, board: Board) -> Option<Board> {
        self.boards.insert(corner, board)
    }

    pub fn remove(&mut self, corner: Corner) -> Option<Board> {
        self.boards.remove(&corner)
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn clear(&mut self) {
        self.boards.clear();
    }

    /// Step every timer board by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> TimerUpdate {
        let mut update = TimerUpdate::default();
        for corner in [Corner::UpperLeft, Corner::UpperRight, Corner::LowerLeft, Corner::LowerRight] {
            let Some(board) = self.boards.get_mut(&corner) else {
                continue;
            };
            let (changed, fired) = board.advance(dt);
            if changed {
                update.changed.push(corner);
            }
            update.expired.extend(fired);
        }
        update
    }
}
