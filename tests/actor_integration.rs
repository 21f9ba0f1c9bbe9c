//! Actor state, inventories and snapshots.

use bevy_ecs::prelude::*;

use gridplay::components::actor::{ActionResolution, Actor, FrameSet, LoopCount};
use gridplay::components::sprite::{Rgb, ShapeKind, Sprite, Visual};
use gridplay::components::stats::HealthChange;
use gridplay::ops::actor::{
    act, add_energy, add_wealth, available_actions, buy, defend, facing, inventory, kill, next_object, set_health, stats,
    take,
};
use gridplay::ops::exists;
use gridplay::ops::persistence::{load_state_file, save_state};
use gridplay::ops::spawn::{self, ActorSpec, ShapeSpec};
use gridplay::resources::assetstore::{ImageInfo, MemoryAssets};
use gridplay::resources::gameconfig::GameConfig;
use gridplay::resources::grid::Cell;
use gridplay::resources::inventory::{Quantity, Thing};
use gridplay::resources::statistics::Statistics;
use gridplay::simulation::Simulation;

fn sheet() -> FrameSet {
    let frame = |k: &str| vec![ImageInfo::new(k, 50, 50)];
    let mut set = FrameSet::new().with_action("idle", frame("idle"));
    for dir in ["left", "right", "front", "back"] {
        set.insert(format!("idle_{}", dir), frame(&format!("idle_{}", dir)));
        set.insert(format!("walk_{}", dir), frame(&format!("walk_{}", dir)));
    }
    set.insert("die", frame("die"));
    set
}

fn make_sim() -> Simulation {
    let mut config = GameConfig::new();
    config.seed = 5;
    Simulation::with_assets(config, MemoryAssets::new().with_actor("hero", sheet()))
}

fn hero(sim: &mut Simulation, cell: Cell) -> Entity {
    spawn::actor(&mut sim.world, ActorSpec::new("hero").at(cell)).unwrap()
}

fn action(sim: &Simulation, e: Entity) -> String {
    sim.world.get::<Actor>(e).unwrap().action.clone()
}

fn quantity(sim: &Simulation, e: Entity, thing: &str) -> Option<Quantity> {
    inventory(&sim.world, e).unwrap().get(thing).map(|t| t.quantity)
}

#[test]
fn reaching_zero_health_dies_once() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    assert_eq!(set_health(&mut sim.world, e, 30.0).unwrap(), HealthChange::Updated);
    assert_eq!(set_health(&mut sim.world, e, 0.0).unwrap(), HealthChange::Died);
    assert_eq!(action(&sim, e), "die");
    assert_eq!(set_health(&mut sim.world, e, 0.0).unwrap(), HealthChange::Updated);

    // Dead actors only take die actions and hold their last frame.
    assert_eq!(act(&mut sim.world, e, "walk", LoopCount::Forever).unwrap(), None);
    for _ in 0..3 {
        sim.tick(0.1).unwrap();
    }
    assert_eq!(action(&sim, e), "die");
    assert!(act(&mut sim.world, e, "die", LoopCount::Times(1)).unwrap().is_some());
}

#[test]
fn out_of_range_health_is_ignored() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    assert_eq!(set_health(&mut sim.world, e, 100.0).unwrap(), HealthChange::Rejected);
    assert_eq!(set_health(&mut sim.world, e, -5.0).unwrap(), HealthChange::Rejected);
    assert_eq!(stats(&sim.world, e).unwrap().health(), 100.0);
}

#[test]
fn energy_and_wealth_clamps() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    assert_eq!(add_energy(&mut sim.world, e, 20.0).unwrap(), 100.0);
    assert_eq!(add_energy(&mut sim.world, e, -250.0).unwrap(), 0.0);
    assert_eq!(add_wealth(&mut sim.world, e, -700.0).unwrap(), -200.0);
    assert_eq!(add_wealth(&mut sim.world, e, 1_000_000.0).unwrap(), 500_000.0);
}

#[test]
fn kill_destroys_after_delay() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    kill(&mut sim.world, e, 0.5).unwrap();
    assert!(!stats(&sim.world, e).unwrap().is_alive());
    sim.tick(0.25).unwrap();
    assert!(exists(&sim.world, e));
    sim.tick(0.25).unwrap();
    assert!(!exists(&sim.world, e));
}

#[test]
fn action_names_resolve_with_fallbacks() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    assert_eq!(
        act(&mut sim.world, e, "walk", LoopCount::Forever).unwrap(),
        Some(ActionResolution::FallbackDirectional("walk_left".into()))
    );
    assert_eq!(action(&sim, e), "walk_left");
    assert_eq!(
        act(&mut sim.world, e, "dance", LoopCount::Forever).unwrap(),
        Some(ActionResolution::FallbackIdle)
    );
    assert_eq!(action(&sim, e), "idle");
    assert_eq!(
        act(&mut sim.world, e, "walk_back", LoopCount::Forever).unwrap(),
        Some(ActionResolution::Found("walk_back".into()))
    );
    assert!(available_actions(&sim.world, e).unwrap().contains(&"die".to_string()));
}

#[test]
fn finite_action_reverts_to_directional_idle() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    act(&mut sim.world, e, "walk", LoopCount::Times(1)).unwrap();
    sim.tick(0.016).unwrap();
    assert_eq!(
        sim.world.get::<Sprite>(e).unwrap().visual,
        Visual::Image("walk_left".into())
    );
    sim.tick(0.016).unwrap();
    assert_eq!(action(&sim, e), "idle_left");
}

#[test]
fn acting_on_a_shape_is_an_error() {
    let mut sim = make_sim();
    let e = spawn::shape(&mut sim.world, ShapeSpec::new(ShapeKind::Rect, Rgb::RED).at((0, 0))).unwrap();
    assert!(act(&mut sim.world, e, "idle", LoopCount::Forever).is_err());
    assert!(stats(&sim.world, e).is_err());
}

#[test]
fn tagged_actors_share_an_inventory() {
    let mut sim = make_sim();
    let a = spawn::actor(&mut sim.world, ActorSpec::new("hero").at((1, 1)).with_tag("team")).unwrap();
    let b = spawn::actor(&mut sim.world, ActorSpec::new("hero").at((3, 1)).with_tag("team")).unwrap();
    let loner = hero(&mut sim, (5, 1));

    take(&mut sim.world, a, Thing::new("key")).unwrap();
    assert_eq!(quantity(&sim, b, "key"), Some(Quantity::Count(1)));
    assert_eq!(quantity(&sim, loner, "key"), None);

    // Taking a held thing again keeps its count; buying adds to it.
    take(&mut sim.world, b, Thing::new("key").with_cost(Some(10.0))).unwrap();
    assert_eq!(quantity(&sim, a, "key"), Some(Quantity::Count(1)));
    assert!(buy(&mut sim.world, b, "key").unwrap());
    assert_eq!(quantity(&sim, a, "key"), Some(Quantity::Count(2)));
}

#[test]
fn buying_spends_wealth_and_grants_energy() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    take(&mut sim.world, e, Thing::new("arrows").with_cost(Some(100.0)).with_energy(5.0)).unwrap();
    take(&mut sim.world, e, Thing::new("map").with_cost(None)).unwrap();
    take(&mut sim.world, e, Thing::new("castle").with_cost(Some(10_000.0))).unwrap();
    add_energy(&mut sim.world, e, -50.0).unwrap();

    assert!(buy(&mut sim.world, e, "arrows").unwrap());
    let s = stats(&sim.world, e).unwrap();
    assert_eq!(s.wealth(), 400.0);
    assert_eq!(s.energy(), 55.0);
    assert_eq!(quantity(&sim, e, "arrows"), Some(Quantity::Count(2)));

    assert!(!buy(&mut sim.world, e, "map").unwrap());
    assert!(!buy(&mut sim.world, e, "castle").unwrap());
    assert!(!buy(&mut sim.world, e, "sword").unwrap());
    assert_eq!(stats(&sim.world, e).unwrap().wealth(), 400.0);
}

#[test]
fn snapshot_survives_a_new_simulation() {
    let path = std::env::temp_dir().join(format!("gridplay-snapshot-{}.json", std::process::id()));

    let mut sim = make_sim();
    let e = hero(&mut sim, (1, 1));
    take(&mut sim.world, e, Thing::new("arrows").with_quantity(Quantity::Unlimited)).unwrap();
    take(&mut sim.world, e, Thing::new("gem").with_quantity(Quantity::Count(2))).unwrap();
    add_wealth(&mut sim.world, e, 250.0).unwrap();
    set_health(&mut sim.world, e, 42.0).unwrap();
    save_state(&sim.world, e, &path).unwrap();
    sim.teardown();

    let mut sim = make_sim();
    let e = hero(&mut sim, (2, 2));
    take(&mut sim.world, e, Thing::new("arrows")).unwrap();
    take(&mut sim.world, e, Thing::new("gem")).unwrap();
    assert!(load_state_file(&mut sim.world, e, &path).unwrap());

    let s = stats(&sim.world, e).unwrap();
    assert_eq!(s.wealth(), 750.0);
    assert_eq!(s.health(), 42.0);
    assert_eq!(quantity(&sim, e, "arrows"), Some(Quantity::Unlimited));
    assert_eq!(quantity(&sim, e, "gem"), Some(Quantity::Count(2)));

    std::fs::remove_file(&path).unwrap();
    assert!(!load_state_file(&mut sim.world, e, &path).unwrap());
}

#[test]
fn next_object_looks_along_facing_direction() {
    let mut sim = make_sim();
    let e = hero(&mut sim, (3, 2));
    let rock = spawn::shape(&mut sim.world, ShapeSpec::new(ShapeKind::Rect, Rgb::GRAY).at((1, 2))).unwrap();

    assert_eq!(facing(&sim.world, e, 2).unwrap(), (1, 2));
    assert_eq!(next_object(&sim.world, e, None, 2).unwrap(), None);
    assert_eq!(next_object(&sim.world, e, None, 3).unwrap(), Some(rock));
    assert_eq!(next_object(&sim.world, e, Some(gridplay::components::actor::Direction::Right), 5).unwrap(), None);
}

#[test]
fn defend_hook_runs_every_tick() {
    let mut sim = make_sim();
    let guard = hero(&mut sim, (1, 1));
    let intruder = hero(&mut sim, (2, 1));
    defend(&mut sim.world, guard, move |world, me| {
        assert_eq!(me, guard);
        world.resource_mut::<Statistics>().add("watch", 1.0);
        if next_object(world, me, Some(gridplay::components::actor::Direction::Right), 2).unwrap() == Some(intruder) {
            spawn::destroy(world, intruder);
        }
    })
    .unwrap();
    defend(&mut sim.world, intruder, |world, _| {
        world.resource_mut::<Statistics>().add("intruder", 1.0);
    })
    .unwrap();

    sim.tick(0.1).unwrap();
    assert!(!exists(&sim.world, intruder));
    let watched = |sim: &Simulation, key: &str| sim.world.resource::<Statistics>().get(key).unwrap_or(0.0);
    assert_eq!(watched(&sim, "intruder"), 0.0);

    // Dead actors keep defending.
    set_health(&mut sim.world, guard, 0.0).unwrap();
    sim.tick(0.1).unwrap();
    sim.tick(0.1).unwrap();
    assert_eq!(watched(&sim, "watch"), 3.0);
}

#[test]
fn defend_requires_an_actor() {
    let mut sim = make_sim();
    let e = spawn::shape(&mut sim.world, ShapeSpec::new(ShapeKind::Rect, Rgb::RED).at((0, 0))).unwrap();
    assert!(defend(&mut sim.world, e, |_, _| {}).is_err());
}
