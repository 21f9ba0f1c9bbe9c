//! Movement policies run by [`wander`](crate::ops::effects::wander).

use std::sync::Arc;

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use log::debug;

use crate::components::actor::{LoopCount, IDLE};
use crate::components::movement::{MoveQueue, Precondition};
use crate::error::EngineResult;
use crate::navigation::astar::astar;
use crate::ops::actor::act_if_actor;
use crate::ops::movement::{move_by, move_to, MoveOptions, MoveToOptions};
use crate::ops::{sprite, spawn};
use crate::resources::grid::{distance, Cell, SpatialGrid};
use crate::resources::rng::SimRng;

pub type PolicyFn = Arc<dyn Fn(&mut World, Entity) -> EngineResult<()> + Send + Sync>;

/// What a wandering sprite does every interval.
#[derive(Clone)]
pub enum WanderPolicy {
    /// Random walk.
    Graze,
    /// Greedy step toward the nearest sprite with one of `tags`.
    Track { tags: Vec<String>, pbad: f32 },
    /// Walk an A* path to a random sprite with one of `tags`.
    TrackAstar { tags: Vec<String>, pabort: f32 },
    Custom(PolicyFn),
}

impl WanderPolicy {
    pub fn track(tags: &[&str], pbad: f32) -> Self {
        WanderPolicy::Track {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pbad,
        }
    }

    pub fn track_astar(tags: &[&str], pabort: f32) -> Self {
        WanderPolicy::TrackAstar {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pabort,
        }
    }

    pub fn run(&self, world: &mut World, entity: Entity) -> EngineResult<()> {
        match self {
            WanderPolicy::Graze => graze(world, entity),
            WanderPolicy::Track { tags, pbad } => track(world, entity, tags, *pbad),
            WanderPolicy::TrackAstar { tags, pabort } => track_astar(world, entity, tags, *pabort),
            WanderPolicy::Custom(f) => f(world, entity),
        }
    }
}

impl std::fmt::Debug for WanderPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WanderPolicy::Graze => write!(f, "Graze"),
            WanderPolicy::Track { tags, pbad } => f.debug_struct("Track").field("tags", tags).field("pbad", pbad).finish(),
            WanderPolicy::TrackAstar { tags, pabort } => {
                f.debug_struct("TrackAstar").field("tags", tags).field("pabort", pabort).finish()
            }
            WanderPolicy::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Stay plus the four orthogonal moves, in that order.
fn candidates((x, y): Cell) -> ArrayVec<Cell, 5> {
    ArrayVec::from([(x, y), (x, y - 1), (x, y + 1), (x + 1, y), (x - 1, y)])
}

/// Sprites carrying any of `tags`, excluding `entity`.
fn targets(world: &mut World, entity: Entity, tags: &[String]) -> Vec<Entity> {
    let mut out = Vec::new();
    for tag in tags {
        out.extend(spawn::entities_with_tag(world, tag).into_iter().filter(|&e| e != entity));
    }
    out
}

/// Move to a random unoccupied, visible neighbour.
pub fn graze(world: &mut World, entity: Entity) -> EngineResult<()> {
    let here = sprite(world, entity)?.pos();
    let mut choices = candidates(here);
    world.resource_mut::<SimRng>().shuffle(&mut choices);
    let grid = world.resource::<SpatialGrid>();
    let pick = choices
        .into_iter()
        .find(|&c| grid.is_empty_at(c) && grid.visible(c) && c != here);
    if let Some(cell) = pick {
        move_by(world, entity, (cell.0 - here.0, cell.1 - here.1), MoveOptions::default())?;
    }
    Ok(())
}

/// Greedy step toward the nearest target. With probability `pbad` the first
/// valid candidate is taken instead of the best one.
pub fn track(world: &mut World, entity: Entity, tags: &[String], pbad: f32) -> EngineResult<()> {
    let here = sprite(world, entity)?.pos();
    let mut nearest: Option<(f32, Cell)> = None;
    for target in targets(world, entity, tags) {
        let pos = sprite(world, target)?.pos();
        let d = distance(pos, here);
        if nearest.is_none_or(|(best, _)| d < best) {
            nearest = Some((d, pos));
        }
    }
    let Some((_, goal)) = nearest else {
        return Ok(());
    };

    let bad = world.resource_mut::<SimRng>().chance(pbad);
    let best = {
        let grid = world.resource::<SpatialGrid>();
        let mut valid = candidates(here).into_iter().filter(|&c| grid.visible(c) && !grid.is_wall(c));
        if bad {
            valid.next()
        } else {
            valid.min_by(|a, b| distance(*a, goal).total_cmp(&distance(*b, goal)))
        }
    };
    match best {
        Some(cell) if cell != here => {
            move_by(world, entity, (cell.0 - here.0, cell.1 - here.1), MoveOptions::default())
        }
        _ => Ok(()),
    }
}

/// Follow an A* path toward a random target, idling when there is none.
/// An entity still walking a previous path keeps following it.
pub fn track_astar(world: &mut World, entity: Entity, tags: &[String], pabort: f32) -> EngineResult<()> {
    let here = sprite(world, entity)?.pos();
    if world.get::<MoveQueue>(entity).is_some() {
        return Ok(());
    }
    let found = targets(world, entity, tags);
    if found.is_empty() {
        act_if_actor(world, entity, IDLE, LoopCount::Forever);
        return Ok(());
    }
    let pick = world.resource_mut::<SimRng>().usize(0..found.len());
    let goal = sprite(world, found[pick])?.pos();

    let path = astar(world.resource::<SpatialGrid>(), here, goal);
    let waypoints: Vec<Cell> = path.map(|p| p.into_iter().skip(1).collect()).unwrap_or_default();
    if waypoints.is_empty() {
        debug!("{:?} has no path to {:?}", entity, goal);
        act_if_actor(world, entity, IDLE, LoopCount::Forever);
        return Ok(());
    }
    move_to(world, entity, waypoints, MoveToOptions::default().with_pabort(pabort))
}

/// Precondition keeping a mover inside the playfield and out of walls.
pub fn player_physics() -> Precondition {
    Arc::new(|_, world: &World, _, cell: Cell| {
        let grid = world.resource::<SpatialGrid>();
        grid.visible(cell) && !grid.is_wall(cell)
    })
}
