//! Scoreboards, pausing and game over.

use std::sync::Arc;

use bevy_ecs::prelude::*;

use gridplay::components::sprite::{Attribute, Rgb, ShapeKind, Sprite, Visual};
use gridplay::events::input::InputEvent;
use gridplay::ops::effects::animate;
use gridplay::ops::game;
use gridplay::ops::input::register_key;
use gridplay::ops::score::{reset_score, score, score_value, stopwatch, timer, ScoreOptions, SCORE_TAG};
use gridplay::ops::spawn::{self, ShapeSpec};
use gridplay::resources::animations::TweenSpec;
use gridplay::resources::gameconfig::GameConfig;
use gridplay::resources::keybindings::KeyDirection;
use gridplay::resources::scoreboard::{Corner, ScoreMode, Scoreboard};
use gridplay::resources::statistics::Statistics;
use gridplay::resources::timers::TimerCallback;
use gridplay::resources::worldtime::WorldTime;
use gridplay::simulation::{ResetMode, Simulation};

fn make_sim() -> Simulation {
    let mut config = GameConfig::new();
    config.seed = 17;
    Simulation::new(config)
}

fn labels(sim: &mut Simulation) -> Vec<String> {
    sim.draw_list()
        .into_iter()
        .filter_map(|item| match item.visual {
            Visual::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

fn score_sprite(sim: &mut Simulation) -> Sprite {
    let tagged = spawn::entities_with_tag(&mut sim.world, SCORE_TAG);
    assert_eq!(tagged.len(), 1);
    sim.world.get::<Sprite>(tagged[0]).unwrap().clone()
}

fn elapsed(sim: &Simulation) -> f32 {
    sim.world.resource::<WorldTime>().elapsed
}

#[test]
fn accumulating_board_keeps_one_label() {
    let mut sim = make_sim();
    assert_eq!(score(&mut sim.world, 5.0, ScoreOptions::new()).unwrap(), 5.0);
    assert_eq!(score(&mut sim.world, 3.0, ScoreOptions::new()).unwrap(), 8.0);
    // Out of range scores count as nothing.
    assert_eq!(score(&mut sim.world, 2000.0, ScoreOptions::new()).unwrap(), 8.0);

    let sprite = score_sprite(&mut sim);
    assert_eq!(sprite.visual, Visual::Text { text: "8".into(), color: Rgb(25, 25, 25) });
    assert_eq!(sprite.rect.x, 25.0);
    assert_eq!(score_value(&sim.world, Corner::UpperLeft), Some(8.0));
}

#[test]
fn right_corner_label_ends_at_the_edge() {
    let mut sim = make_sim();
    let options = || {
        ScoreOptions::new()
            .at(Corner::UpperRight)
            .with_mode(ScoreMode::Value)
            .with_prefix("Level:")
    };
    score(&mut sim.world, 2.0, options()).unwrap();
    score(&mut sim.world, 7.0, options()).unwrap();
    assert_eq!(labels(&mut sim), vec!["Level: 7".to_string()]);
    let rect = score_sprite(&mut sim).rect;
    assert!((rect.x + rect.w - 775.0).abs() < 1e-3);
}

#[test]
fn reset_score_starts_from_zero() {
    let mut sim = make_sim();
    score(&mut sim.world, 5.0, ScoreOptions::new()).unwrap();
    assert_eq!(reset_score(&mut sim.world, ScoreOptions::new()).unwrap(), 0.0);
    assert_eq!(labels(&mut sim), vec!["0".to_string()]);
    assert_eq!(score(&mut sim.world, 1.0, ScoreOptions::new()).unwrap(), 1.0);
}

#[test]
fn countdown_reaching_zero_ends_the_game() {
    let mut sim = make_sim();
    timer(&mut sim.world, 2.0, None).unwrap();
    assert_eq!(labels(&mut sim), vec!["Time Remaining: 00:00:02".to_string()]);

    sim.tick(1.0).unwrap();
    assert_eq!(score_value(&sim.world, Corner::LowerRight), Some(1.0));
    assert_eq!(labels(&mut sim), vec!["Time Remaining: 00:00:01".to_string()]);

    sim.tick(1.0).unwrap();
    assert!(labels(&mut sim).contains(&"GAME OVER".to_string()));
    assert!(!sim.run_state().is_over());

    sim.tick(0.25).unwrap();
    assert!(!sim.run_state().is_over());
    sim.tick(0.25).unwrap();
    assert!(sim.run_state().is_over());

    // Nothing advances once the game is over, and it cannot be paused.
    sim.tick(1.0).unwrap();
    assert_eq!(elapsed(&sim), 2.5);
    sim.pause();
    assert!(!sim.run_state().is_paused());
}

#[test]
fn stopwatch_runs_its_callback_once() {
    let mut sim = make_sim();
    let stopped: TimerCallback = Arc::new(|world: &mut World| {
        world.resource_mut::<Statistics>().add("stopped", 1.0);
    });
    stopwatch(&mut sim.world, 0.0, 2.0, Some(stopped)).unwrap();
    for _ in 0..5 {
        sim.tick(1.0).unwrap();
    }
    assert_eq!(sim.world.resource::<Statistics>().get("stopped"), Some(1.0));
    assert_eq!(score_value(&sim.world, Corner::LowerLeft), Some(2.0));
    assert!(sim.run_state().is_running());
}

#[test]
fn pause_freezes_the_world_until_resumed_by_a_key() {
    let mut sim = make_sim();
    let e = spawn::shape(&mut sim.world, ShapeSpec::new(ShapeKind::Rect, Rgb::BLUE).at((0, 0))).unwrap();
    animate(&mut sim.world, e, TweenSpec::new(1.0).with(Attribute::X, 4.0)).unwrap();
    register_key(&mut sim.world, "p", KeyDirection::Down, game::resume);

    sim.tick(0.25).unwrap();
    game::pause(&mut sim.world);
    assert!(game::is_paused(&sim.world));
    sim.tick(0.25).unwrap();
    sim.tick(0.25).unwrap();
    assert_eq!(elapsed(&sim), 0.25);
    assert_eq!(sim.world.get::<Sprite>(e).unwrap().grid_pos().0, 1.0);

    sim.handle_input(InputEvent::KeyDown("p".into()));
    assert!(sim.run_state().is_running());
    sim.tick(0.25).unwrap();
    assert_eq!(sim.world.get::<Sprite>(e).unwrap().grid_pos().0, 2.0);
}

#[test]
fn reset_clears_boards_and_game_over() {
    let mut sim = make_sim();
    score(&mut sim.world, 4.0, ScoreOptions::new()).unwrap();
    game::gameover(&mut sim.world, 0.0);
    sim.tick(0.1).unwrap();
    assert!(game::is_over(&sim.world));

    sim.reset(ResetMode::Soft);
    assert!(sim.run_state().is_running());
    assert!(sim.world.resource::<Scoreboard>().is_empty());
    sim.tick(0.1).unwrap();
    assert!((elapsed(&sim) - 0.1).abs() < 1e-6);
}
