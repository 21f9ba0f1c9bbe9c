//! Collisions, pointer input, grid registration and level flow.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bevy_ecs::prelude::*;

use gridplay::components::collision::CollisionRules;
use gridplay::components::sprite::{Rgb, ShapeKind, Sprite};
use gridplay::components::tag::Tag;
use gridplay::error::EngineResult;
use gridplay::events::input::InputEvent;
use gridplay::ops::input::{clicked, collides, follow, register_key};
use gridplay::ops::movement::{move_by, MoveOptions};
use gridplay::ops::spawn::{self, ShapeSpec};
use gridplay::resources::gameconfig::GameConfig;
use gridplay::resources::grid::{Cell, SpatialGrid};
use gridplay::resources::keybindings::KeyDirection;
use gridplay::resources::statistics::Statistics;
use gridplay::simulation::{Level, ResetMode, Simulation};

fn make_sim() -> Simulation {
    let mut config = GameConfig::new();
    config.seed = 21;
    Simulation::new(config)
}

fn block(world: &mut World, cell: Cell) -> EngineResult<Entity> {
    spawn::shape(world, ShapeSpec::new(ShapeKind::Rect, Rgb::ORANGE).at(cell))
}

fn counter(sim: &Simulation, key: &str) -> f64 {
    sim.world.resource::<Statistics>().get(key).unwrap_or(0.0)
}

fn bump(world: &mut World, key: &str) {
    world.resource_mut::<Statistics>().add(key, 1.0);
}

#[test]
fn collision_fires_while_overlapping() {
    let mut sim = make_sim();
    let a = block(&mut sim.world, (0, 0)).unwrap();
    let b = block(&mut sim.world, (1, 0)).unwrap();
    collides(&mut sim.world, a, &[a, b], move |world, me, other| {
        assert_eq!((me, other), (a, b));
        bump(world, "hits");
    })
    .unwrap();
    assert_eq!(sim.world.get::<CollisionRules>(a).map(|r| r.len()), Some(1));

    // Touching edges do not overlap.
    sim.tick(0.1).unwrap();
    assert_eq!(counter(&sim, "hits"), 0.0);

    sim.world.get_mut::<Sprite>(a).unwrap().set_pos(0.5, 0.0);
    sim.tick(0.1).unwrap();
    assert_eq!(counter(&sim, "hits"), 1.0);
    sim.tick(0.1).unwrap();
    assert_eq!(counter(&sim, "hits"), 2.0);

    assert!(spawn::destroy(&mut sim.world, b));
    sim.tick(0.1).unwrap();
    assert_eq!(counter(&sim, "hits"), 2.0);
    assert_eq!(sim.world.get::<CollisionRules>(a).map(|r| r.len()), Some(0));
}

#[test]
fn click_records_position_and_runs_callback() {
    let mut sim = make_sim();
    let e = block(&mut sim.world, (2, 2)).unwrap();
    clicked(&mut sim.world, e, 1, |world, _| bump(world, "clicks")).unwrap();

    sim.handle_input(InputEvent::MouseDown { button: 3, x: 125.0, y: 130.0 });
    assert_eq!(counter(&sim, "clicks"), 0.0);
    sim.handle_input(InputEvent::MouseDown { button: 1, x: 400.0, y: 400.0 });
    assert_eq!(counter(&sim, "clicks"), 0.0);

    sim.handle_input(InputEvent::MouseDown { button: 1, x: 125.0, y: 130.0 });
    assert_eq!(counter(&sim, "clicks"), 1.0);
    let (x, y) = sim.world.get::<Sprite>(e).unwrap().event_pos.unwrap();
    assert!((x - 2.5).abs() < 1e-4);
    assert!((y - 2.6).abs() < 1e-4);
}

#[test]
fn follower_is_centred_on_the_mouse() {
    let mut sim = make_sim();
    let e = block(&mut sim.world, (0, 0)).unwrap();
    follow(&mut sim.world, e).unwrap();
    sim.handle_input(InputEvent::MouseMove { x: 300.0, y: 310.0 });
    let rect = sim.world.get::<Sprite>(e).unwrap().rect;
    assert_eq!((rect.x, rect.y), (275.0, 285.0));
}

#[test]
fn key_up_bindings_fire_on_release() {
    let mut sim = make_sim();
    register_key(&mut sim.world, "space", KeyDirection::Up, |world| bump(world, "released"));
    sim.handle_input(InputEvent::KeyDown("space".into()));
    assert_eq!(counter(&sim, "released"), 0.0);
    sim.handle_input(InputEvent::KeyUp("space".into()));
    assert_eq!(counter(&sim, "released"), 1.0);
}

#[test]
fn grid_follows_a_wide_sprite() {
    let mut sim = make_sim();
    let e = spawn::shape(
        &mut sim.world,
        ShapeSpec::new(ShapeKind::Rect, Rgb::BLUE).at((1, 1)).with_size(2.0, 1.0).with_tag(Tag::WALL),
    )
    .unwrap();
    {
        let grid = sim.world.resource::<SpatialGrid>();
        assert!(grid.is_wall((1, 1)));
        assert!(grid.is_wall((2, 1)));
        assert!(!grid.is_wall((3, 1)));
    }

    move_by(&mut sim.world, e, (1, 0), MoveOptions::default()).unwrap();
    sim.tick(0.25).unwrap();
    let grid = sim.world.resource::<SpatialGrid>();
    assert!(grid.is_empty_at((1, 1)));
    assert_eq!(grid.entities_at((3, 1)).collect::<Vec<_>>(), vec![e]);
    assert!(!grid.is_obstacle((3, 1)));
}

#[test]
fn fill_covers_every_free_cell() {
    let mut config = GameConfig::new();
    config.width = 200;
    config.height = 200;
    let mut sim = Simulation::new(config);
    block(&mut sim.world, (0, 0)).unwrap();
    block(&mut sim.world, (3, 3)).unwrap();

    let spawned = spawn::fill(&mut sim.world, 1.0, block).unwrap();
    assert_eq!(spawned.len(), 14);
    assert_eq!(sim.world.resource::<SpatialGrid>().free_cells(), Vec::<Cell>::new());
}

#[test]
fn random_placement_avoids_occupied_cells() {
    let mut config = GameConfig::new();
    config.width = 100;
    config.height = 100;
    config.seed = 8;
    let mut sim = Simulation::new(config);
    for cell in [(0, 0), (1, 0), (0, 1)] {
        block(&mut sim.world, cell).unwrap();
    }
    let e = spawn::shape(&mut sim.world, ShapeSpec::new(ShapeKind::Circle, Rgb::WHITE)).unwrap();
    assert_eq!(sim.world.get::<Sprite>(e).unwrap().pos(), (1, 1));
}

#[test]
fn draw_list_is_in_spawn_order() {
    let mut sim = make_sim();
    let a = block(&mut sim.world, (4, 4)).unwrap();
    let b = block(&mut sim.world, (0, 0)).unwrap();
    let items = sim.draw_list();
    assert_eq!(items.iter().map(|i| i.entity).collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(items[0].rect.x, 200.0);
}

#[test]
fn spawn_order_survives_recycled_entities() {
    let mut sim = make_sim();
    let crate_at = |world: &mut World, cell: Cell| {
        spawn::shape(world, ShapeSpec::new(ShapeKind::Rect, Rgb::ORANGE).at(cell).with_tag("crate")).unwrap()
    };
    let mut spawned = Vec::new();
    for x in 0..4 {
        spawned.push(crate_at(&mut sim.world, (x, 0)));
    }
    for &e in &spawned[..3] {
        assert!(spawn::destroy(&mut sim.world, e));
    }
    let late: Vec<Entity> = (0..3).map(|x| crate_at(&mut sim.world, (x, 5))).collect();
    let expected = [spawned[3], late[0], late[1], late[2]];

    let drawn: Vec<Entity> = sim.draw_list().iter().map(|i| i.entity).collect();
    assert_eq!(drawn, expected);
    assert_eq!(spawn::entities_with_tag(&mut sim.world, "crate"), expected);
}

struct Stage {
    number: u32,
    blocks: i32,
}

impl Level for Stage {
    fn setup(&mut self, world: &mut World) -> EngineResult<()> {
        for x in 0..self.blocks {
            block(world, (x, 0))?;
        }
        Ok(())
    }

    fn completed(&self, world: &World) -> bool {
        world.resource::<Statistics>().get("score").unwrap_or(0.0) >= self.number as f64
    }

    fn next(&mut self) -> Option<Box<dyn Level>> {
        (self.number < 2).then(|| {
            Box::new(Stage {
                number: self.number + 1,
                blocks: self.blocks + 1,
            }) as Box<dyn Level>
        })
    }
}

#[test]
fn completed_level_is_replaced_after_soft_reset() {
    let mut sim = make_sim();
    sim.set_level(Box::new(Stage { number: 1, blocks: 1 })).unwrap();
    assert!(sim.has_level());
    assert_eq!(spawn::sprite_count(&mut sim.world), 1);

    sim.tick(0.1).unwrap();
    assert_eq!(spawn::sprite_count(&mut sim.world), 1);

    bump(&mut sim.world, "score");
    sim.tick(0.1).unwrap();
    assert_eq!(spawn::sprite_count(&mut sim.world), 2);
    assert_eq!(counter(&sim, "score"), 1.0);

    // The last stage has no successor and stays active.
    bump(&mut sim.world, "score");
    sim.tick(0.1).unwrap();
    assert_eq!(spawn::sprite_count(&mut sim.world), 2);
    assert!(sim.has_level());
}

struct Finale {
    asked: Arc<AtomicU32>,
}

impl Level for Finale {
    fn setup(&mut self, _: &mut World) -> EngineResult<()> {
        Ok(())
    }

    fn completed(&self, _: &World) -> bool {
        true
    }

    fn next(&mut self) -> Option<Box<dyn Level>> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        None
    }
}

#[test]
fn last_level_is_asked_for_a_successor_once() {
    let mut sim = make_sim();
    let asked = Arc::new(AtomicU32::new(0));
    sim.set_level(Box::new(Finale { asked: asked.clone() })).unwrap();
    for _ in 0..3 {
        sim.tick(0.1).unwrap();
    }
    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert!(sim.has_level());

    // A new level is polled again.
    sim.set_level(Box::new(Finale { asked: asked.clone() })).unwrap();
    sim.tick(0.1).unwrap();
    assert_eq!(asked.load(Ordering::SeqCst), 2);
}

#[test]
fn hard_reset_clears_everything() {
    let mut sim = make_sim();
    sim.set_level(Box::new(Stage { number: 1, blocks: 3 })).unwrap();
    register_key(&mut sim.world, "x", KeyDirection::Down, |world| bump(world, "x"));
    bump(&mut sim.world, "kept");

    sim.reset(ResetMode::Soft);
    assert_eq!(spawn::sprite_count(&mut sim.world), 0);
    assert!(!sim.has_level());
    assert_eq!(counter(&sim, "kept"), 1.0);
    sim.handle_input(InputEvent::KeyDown("x".into()));
    assert_eq!(counter(&sim, "x"), 0.0);

    sim.reset(ResetMode::Hard);
    assert_eq!(counter(&sim, "kept"), 0.0);
    assert_eq!(sim.world.resource::<SpatialGrid>().occupied_cells(), 0);
}
