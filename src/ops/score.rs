//! Scoreboard operations.
//!
//! The first [`score`] call on a corner builds its board from
//! [`ScoreOptions`]; later calls only apply the value. Every change
//! replaces the board's text sprite.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use log::warn;

use crate::components::sprite::Rgb;
use crate::error::EngineResult;
use crate::ops::game;
use crate::ops::spawn::{self, TextSpec};
use crate::ops::sprite_mut;
use crate::resources::grid::SpatialGrid;
use crate::resources::scoreboard::{Board, Corner, ScoreMode, Scoreboard, MAX_SCORE_STEP};
use crate::resources::timers::TimerCallback;

/// Tag carried by scoreboard text sprites.
pub const SCORE_TAG: &str = "score";

/// Construction settings of a board.
#[derive(Clone)]
pub struct ScoreOptions {
    pub corner: Corner,
    pub mode: ScoreMode,
    pub color: Rgb,
    /// Font height in cells.
    pub size: f32,
    pub prefix: Option<String>,
    /// Runs once when a timer board reaches its goal.
    pub on_goal: Option<TimerCallback>,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            corner: Corner::UpperLeft,
            mode: ScoreMode::Accumulate,
            color: Rgb(25, 25, 25),
            size: 0.75,
            prefix: None,
            on_goal: None,
        }
    }
}

impl ScoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, corner: Corner) -> Self {
        self.corner = corner;
        self
    }

    pub fn with_mode(mut self, mode: ScoreMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn on_goal(mut self, callback: impl Fn(&mut World) + Send + Sync + 'static) -> Self {
        self.on_goal = Some(Arc::new(callback));
        self
    }
}

/// Score `value` on the board at `options.corner`, building it first if
/// needed. Values beyond [`MAX_SCORE_STEP`] count as 0. Returns the
/// board's value.
pub fn score(world: &mut World, value: f64, options: ScoreOptions) -> EngineResult<f64> {
    let value = if value.abs() > MAX_SCORE_STEP {
        warn!("score {} rejected", value);
        0.0
    } else {
        value
    };
    let corner = options.corner;
    let current = {
        let mut boards = world.get_resource_or_init::<Scoreboard>();
        match boards.get_mut(corner) {
            Some(board) => {
                board.score(value);
                board.value
            }
            None => {
                let mut board = Board::new(value, options.mode).with_callback(options.on_goal);
                board.prefix = options.prefix;
                board.color = options.color;
                board.size = options.size;
                boards.insert(corner, board);
                value
            }
        }
    };
    refresh(world, corner)?;
    Ok(current)
}

/// Drop the board at `options.corner` and build a fresh one from `options`
/// with a value of 0.
pub fn reset_score(world: &mut World, options: ScoreOptions) -> EngineResult<f64> {
    let removed = world.get_resource_mut::<Scoreboard>().and_then(|mut b| b.remove(options.corner));
    if let Some(sprite) = removed.and_then(|b| b.sprite) {
        spawn::destroy(world, sprite);
    }
    score(world, 0.0, options)
}

pub fn score_value(world: &World, corner: Corner) -> Option<f64> {
    world.get_resource::<Scoreboard>().and_then(|b| b.value(corner))
}

/// Count down from `seconds` in the lower right corner. Without a
/// callback, reaching zero shows "GAME OVER" and ends the game.
pub fn timer(world: &mut World, seconds: f64, on_goal: Option<TimerCallback>) -> EngineResult<f64> {
    let options = ScoreOptions {
        corner: Corner::LowerRight,
        mode: ScoreMode::countdown(),
        color: Rgb::BLACK,
        prefix: Some("Time Remaining:".into()),
        on_goal: Some(on_goal.unwrap_or_else(game_over_callback)),
        ..ScoreOptions::default()
    };
    score(world, seconds, options)
}

/// Count up from `start` to `goal` in the lower left corner. Without a
/// callback, reaching the goal shows "GAME OVER" and ends the game.
pub fn stopwatch(world: &mut World, start: f64, goal: f64, on_goal: Option<TimerCallback>) -> EngineResult<f64> {
    let options = ScoreOptions {
        corner: Corner::LowerLeft,
        mode: ScoreMode::count_up(goal),
        color: Rgb::BLACK,
        prefix: Some("Duration:".into()),
        on_goal: Some(on_goal.unwrap_or_else(game_over_callback)),
        ..ScoreOptions::default()
    };
    score(world, start, options)
}

fn game_over_callback() -> TimerCallback {
    Arc::new(|world: &mut World| {
        if let Err(e) = spawn::text(world, TextSpec::new("GAME OVER", Rgb::BLACK)) {
            warn!("unable to show game over: {}", e);
        }
        game::gameover(world, game::GAMEOVER_DELAY);
    })
}

/// Replace the text sprite of the board at `corner`.
pub(crate) fn refresh(world: &mut World, corner: Corner) -> EngineResult<()> {
    let Some((label, color, size, old)) = world
        .get_resource::<Scoreboard>()
        .and_then(|b| b.get(corner))
        .map(|b| (b.label(), b.color, b.size, b.sprite))
    else {
        return Ok(());
    };
    if let Some(old) = old {
        spawn::destroy(world, old);
    }
    let (width, height) = world
        .get_resource::<SpatialGrid>()
        .map_or((16.0, 16.0), |g| (g.width, g.height));
    let (x, y) = corner.anchor(width, height);
    let spec = TextSpec::new(label, color).at(x, y).with_size(size).with_tag(SCORE_TAG);
    let entity = spawn::text(world, spec)?;
    if corner.is_right() {
        let mut sprite = sprite_mut(world, entity)?;
        let w = sprite.rect.w;
        sprite.rect.x -= w;
    }
    if let Some(board) = world.resource_mut::<Scoreboard>().get_mut(corner) {
        board.sprite = Some(entity);
    }
    Ok(())
}
