//! Directional actor state machine.
//!
//! An [`Actor`] plays one action at a time. Actions are named frame
//! sequences such as `walk_left` or `die`; abstract requests like `walk`
//! resolve against the loaded [`FrameSet`] through [`resolve_action`].
//!
//! Frame advance runs once per tick in
//! [`actor_frames`](crate::systems::animation::actor_frames): every
//! `frame_rate` ticks the frame index moves forward, and when a finite
//! loop count is used up the actor reverts to idle in its current direction.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy_ecs::prelude::{Component, Entity, World};

use crate::resources::assetstore::ImageInfo;
use crate::resources::grid::Cell;

pub const IDLE: &str = "idle";
pub const WALK: &str = "walk";
pub const DIE: &str = "die";

/// Facing of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Left,
    Right,
    Front,
    Back,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Front, Direction::Back];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Front => "front",
            Direction::Back => "back",
        }
    }

    /// Unit step in grid coordinates; `Front` faces down the screen.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Front => (0, 1),
            Direction::Back => (0, -1),
        }
    }

    /// Direction of a movement vector: x is checked before y.
    /// A zero vector faces left.
    pub fn from_vector(dx: i32, dy: i32) -> Direction {
        if dx > 0 {
            Direction::Right
        } else if dx < 0 {
            Direction::Left
        } else if dy > 0 {
            Direction::Front
        } else if dy < 0 {
            Direction::Back
        } else {
            Direction::Left
        }
    }

    pub fn offset(self, cell: Cell, distance: i32) -> Cell {
        let (dx, dy) = self.delta();
        (cell.0 + dx * distance, cell.1 + dy * distance)
    }
}

/// How many times an action plays before reverting to idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Forever,
    Times(u32),
}

impl LoopCount {
    fn allows(self, iterations: u32) -> bool {
        match self {
            LoopCount::Forever => true,
            LoopCount::Times(n) => iterations < n,
        }
    }
}

/// Frames per action name, shared by every actor spawned from the same sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSet {
    actions: BTreeMap<String, Vec<ImageInfo>>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, name: impl Into<String>, frames: Vec<ImageInfo>) -> Self {
        self.insert(name, frames);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, frames: Vec<ImageInfo>) {
        self.actions.insert(name.into(), frames);
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub fn frames(&self, action: &str) -> &[ImageInfo] {
        self.actions.get(action).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Action names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Name of the first action with no frames, if any.
    pub fn first_empty_action(&self) -> Option<&str> {
        self.actions.iter().find(|(_, v)| v.is_empty()).map(|(k, _)| k.as_str())
    }

    /// Idle action for `direction`: `idle_<dir>`, then `idle`, then the first
    /// action in the set.
    pub fn idle_for(&self, direction: Direction) -> Option<&str> {
        let directional = format!("{}_{}", IDLE, direction.as_str());
        if let Some((k, _)) = self.actions.get_key_value(directional.as_str()) {
            return Some(k.as_str());
        }
        if let Some((k, _)) = self.actions.get_key_value(IDLE) {
            return Some(k.as_str());
        }
        self.names().next()
    }
}

/// Outcome of resolving an action request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResolution {
    /// The literal name exists.
    Found(String),
    /// `<action>_<direction>` exists.
    FallbackDirectional(String),
    /// Neither exists; play idle instead.
    FallbackIdle,
}

/// Resolve `action` against `frames` for an actor facing `direction`.
pub fn resolve_action(frames: &FrameSet, action: &str, direction: Direction) -> ActionResolution {
    if frames.contains(action) {
        return ActionResolution::Found(action.to_string());
    }
    let directional = format!("{}_{}", action, direction.as_str());
    if frames.contains(&directional) {
        return ActionResolution::FallbackDirectional(directional);
    }
    ActionResolution::FallbackIdle
}

/// Called with the actor at the start of every tick, dead or alive.
#[derive(Component, Clone)]
pub struct Defend(pub Arc<dyn Fn(&mut World, Entity) + Send + Sync>);

impl std::fmt::Debug for Defend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Defend")
    }
}

#[derive(Component, Clone, Debug)]
pub struct Actor {
    pub name: String,
    pub frames: Arc<FrameSet>,
    pub action: String,
    pub index: usize,
    pub iterations: u32,
    pub loop_count: LoopCount,
    frame_count: u32,
    frame_rate: u32,
    pub direction: Direction,
    /// Key into the [`InventoryRegistry`](crate::resources::inventory::InventoryRegistry).
    pub inventory: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, frames: Arc<FrameSet>, inventory: impl Into<String>) -> Self {
        let action = frames.idle_for(Direction::Left).unwrap_or(IDLE).to_string();
        Actor {
            name: name.into(),
            frames,
            action,
            index: 0,
            iterations: 0,
            loop_count: LoopCount::Forever,
            frame_count: 0,
            frame_rate: 1,
            direction: Direction::Left,
            inventory: inventory.into(),
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Ticks per frame, clamped to `[1, 60]`.
    pub fn set_frame_rate(&mut self, rate: i32) {
        self.frame_rate = rate.clamp(1, 60) as u32;
    }

    /// Switch to a concrete action, restarting its frames.
    pub fn play(&mut self, action: &str, loop_count: LoopCount) {
        self.action = action.to_string();
        self.index = 0;
        self.iterations = 0;
        self.frame_count = 0;
        self.loop_count = loop_count;
    }

    /// Turn to `direction`; the frame index restarts when the facing changes.
    pub fn face(&mut self, direction: Direction) {
        if direction != self.direction {
            self.index = 0;
        }
        self.direction = direction;
    }

    pub fn current_frame(&self) -> Option<&ImageInfo> {
        let frames = self.frames.frames(&self.action);
        frames.get(self.index.min(frames.len().saturating_sub(1)))
    }

    /// Advance one tick. Dead actors hold their last frame instead of
    /// reverting to idle.
    pub fn advance_frame(&mut self, alive: bool) {
        if self.loop_count.allows(self.iterations) {
            self.frame_count += 1;
            if self.frame_count >= self.frame_rate {
                self.index += 1;
                self.frame_count = 0;
            }
            let len = self.frames.frames(&self.action).len();
            if self.index >= len {
                self.iterations += 1;
                if self.loop_count.allows(self.iterations) {
                    self.index = 0;
                } else {
                    self.index = len.saturating_sub(1);
                }
            }
        } else if alive {
            let idle = self.frames.idle_for(self.direction).unwrap_or(IDLE).to_string();
            self.action = idle;
            self.index = 0;
            self.loop_count = LoopCount::Forever;
            self.iterations = 0;
        }
    }
}
