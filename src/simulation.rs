//! The simulation context.
//!
//! [`Simulation`] owns the [`World`] with every engine resource, the
//! per-tick [`Schedule`] and the active [`Level`]. Hosts drive it with
//! [`Simulation::tick`] and [`Simulation::handle_input`] and draw whatever
//! [`Simulation::draw_list`] returns.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::sprite::{SpawnOrder, SpawnSequence, Sprite, VirtRect, Visual};
use crate::error::EngineResult;
use crate::events::collision::on_collision;
use crate::events::input::{on_input, InputEvent};
use crate::ops::game;
use crate::resources::animations::AnimationSet;
use crate::resources::assetstore::{AssetProvider, AssetStore, MemoryAssets};
use crate::resources::gameconfig::GameConfig;
use crate::resources::grid::SpatialGrid;
use crate::resources::inventory::InventoryRegistry;
use crate::resources::keybindings::KeyBindings;
use crate::resources::rng::SimRng;
use crate::resources::runstate::RunState;
use crate::resources::scoreboard::Scoreboard;
use crate::resources::statistics::Statistics;
use crate::resources::timers::Timers;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::{actor_frames, run_defenders};
use crate::systems::collision::collision_detector;
use crate::systems::grid::register_grid;
use crate::systems::time::{update_scoreboards, update_timers, update_world_time};
use crate::systems::tween::{advance_animations, flush_animations};

/// What [`Simulation::reset`] clears besides sprites, bindings, animations,
/// timers, scoreboards and the pause and game-over flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetMode {
    /// Keep inventories, statistics and cached assets. Used between levels.
    Soft,
    /// Start over completely.
    Hard,
}

/// A stage of a game.
pub trait Level {
    /// Populate the world.
    fn setup(&mut self, world: &mut World) -> EngineResult<()>;
    /// Polled once per tick until it first returns true.
    fn completed(&self, world: &World) -> bool;
    /// The level to play once this one is completed. Asked once; `None`
    /// leaves this level active but no longer polled.
    fn next(&mut self) -> Option<Box<dyn Level>>;
}

/// One sprite as the renderer should draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub entity: Entity,
    /// Pixels.
    pub rect: VirtRect,
    pub visual: Visual,
    pub angle: f32,
    pub pixelated: f32,
}

pub struct Simulation {
    pub world: World,
    schedule: Schedule,
    level: Option<Box<dyn Level>>,
    /// The active level completed and had no successor.
    level_done: bool,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        Simulation::with_assets(config, MemoryAssets::new())
    }

    pub fn with_assets(config: GameConfig, provider: impl AssetProvider + 'static) -> Self {
        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(
            config.width as f32,
            config.height as f32,
            config.grid_size as f32,
        ));
        world.insert_resource(SimRng::with_seed(config.seed));
        world.insert_resource(config);
        world.insert_resource(WorldTime::default());
        world.insert_resource(AnimationSet::default());
        world.insert_resource(InventoryRegistry::default());
        world.insert_resource(KeyBindings::default());
        world.insert_resource(AssetStore::new(provider));
        world.insert_resource(Timers::default());
        world.insert_resource(Statistics::default());
        world.insert_resource(SpawnSequence::default());
        world.insert_resource(Scoreboard::default());
        world.insert_resource(RunState::default());

        world.add_observer(on_input);
        world.add_observer(on_collision);
        world.flush();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                advance_animations,
                run_defenders,
                actor_frames,
                collision_detector,
                update_timers,
                update_scoreboards,
                flush_animations,
                register_grid,
            )
                .chain(),
        );

        Simulation {
            world,
            schedule,
            level: None,
            level_done: false,
        }
    }

    /// Advance the simulation by `dt` seconds. Nothing happens while the
    /// game is paused or over.
    pub fn tick(&mut self, dt: f32) -> EngineResult<()> {
        if !self.world.resource::<RunState>().is_running() {
            return Ok(());
        }
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);

        if self.level_done {
            return Ok(());
        }
        let next = match self.level.as_mut() {
            Some(level) if level.completed(&self.world) => level.next(),
            _ => return Ok(()),
        };
        info!("level completed");
        match next {
            Some(next) => {
                self.reset(ResetMode::Soft);
                self.set_level(next)?;
            }
            None => {
                info!("no level follows");
                self.level_done = true;
            }
        }
        Ok(())
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.world.trigger(event);
        self.world.flush();
    }

    /// Make `level` the active level and run its setup.
    pub fn set_level(&mut self, mut level: Box<dyn Level>) -> EngineResult<()> {
        level.setup(&mut self.world)?;
        self.world.flush();
        self.level = Some(level);
        self.level_done = false;
        info!("level started");
        Ok(())
    }

    pub fn has_level(&self) -> bool {
        self.level.is_some()
    }

    pub fn reset(&mut self, mode: ResetMode) {
        let sprites: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Sprite>>()
            .iter(&self.world)
            .collect();
        let count = sprites.len();
        for entity in sprites {
            self.world.despawn(entity);
        }
        self.world.resource_mut::<KeyBindings>().clear();
        self.world.resource_mut::<AnimationSet>().clear();
        self.world.resource_mut::<Timers>().clear();
        self.world.resource_mut::<SpatialGrid>().clear();
        self.world.resource_mut::<WorldTime>().restart();
        self.world.resource_mut::<Scoreboard>().clear();
        *self.world.resource_mut::<RunState>() = RunState::default();
        if mode == ResetMode::Hard {
            self.world.resource_mut::<InventoryRegistry>().clear();
            self.world.resource_mut::<Statistics>().clear();
            self.world.resource_mut::<AssetStore>().clear_cache();
        }
        self.level = None;
        self.level_done = false;
        info!("{:?} reset, {} sprites removed", mode, count);
    }

    /// Consume the simulation and release everything it holds.
    pub fn teardown(mut self) {
        self.reset(ResetMode::Hard);
        info!("simulation torn down");
    }

    /// Sprites in spawn order.
    pub fn draw_list(&mut self) -> Vec<DrawItem> {
        let mut items: Vec<((u64, Entity), DrawItem)> = self
            .world
            .query::<(Entity, &Sprite, Option<&SpawnOrder>)>()
            .iter(&self.world)
            .map(|(entity, s, order)| {
                let item = DrawItem {
                    entity,
                    rect: s.rect,
                    visual: s.visual.clone(),
                    angle: s.angle,
                    pixelated: s.pixelated,
                };
                (SpawnOrder::key(order, entity), item)
            })
            .collect();
        items.sort_by_key(|(key, _)| *key);
        items.into_iter().map(|(_, item)| item).collect()
    }

    pub fn pause(&mut self) {
        game::pause(&mut self.world);
    }

    pub fn resume(&mut self) {
        game::resume(&mut self.world);
    }

    pub fn run_state(&self) -> RunState {
        *self.world.resource::<RunState>()
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }
}
