//! Gridplay demo.
//!
//! A small maze game drawn with raylib: walk the hero with the arrow keys,
//! collect every coin and avoid the ghosts, which chase the hero along A*
//! paths. Each round adds a ghost. `p` pauses and resumes.
//!
//! # Running
//!
//! ```sh
//! cargo run --release --features raylib -- --config config.ini --grid
//! ```

// Do not create console on Windows
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use clap::Parser;
use raylib::prelude::*;

use gridplay::components::actor::FrameSet;
use gridplay::components::movement::{KeyMover, KeyScheme};
use gridplay::components::sprite::{Rgb, ShapeKind, Visual};
use gridplay::components::tag::Tag;
use gridplay::error::EngineResult;
use gridplay::events::input::InputEvent;
use gridplay::navigation::policies::{player_physics, WanderPolicy};
use gridplay::ops::spawn::{self, ActorSpec, ShapeSpec, TextSpec};
use gridplay::ops::score::{self, ScoreOptions};
use gridplay::ops::{actor, effects, game, input, movement};
use gridplay::resources::assetstore::{ImageInfo, MemoryAssets};
use gridplay::resources::gameconfig::GameConfig;
use gridplay::resources::keybindings::KeyDirection;
use gridplay::resources::statistics::Statistics;
use gridplay::simulation::{Level, ResetMode, Simulation};

const COINS_PER_ROUND: u32 = 6;

/// Gridplay maze demo
#[derive(Parser)]
#[command(version, about = "Grid maze demo for the gridplay engine")]
struct Cli {
    /// INI file with window, grid and engine settings.
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    /// Random seed; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Draw the grid overlay.
    #[arg(long)]
    grid: bool,
}

struct Maze {
    round: u32,
    goal: f64,
}

impl Maze {
    fn first() -> Self {
        Maze {
            round: 1,
            goal: COINS_PER_ROUND as f64,
        }
    }
}

impl Level for Maze {
    fn setup(&mut self, world: &mut World) -> EngineResult<()> {
        let (cols, rows) = world.resource::<GameConfig>().grid_dimensions();
        let (cols, rows) = (cols as i32, rows as i32);
        let wall = |world: &mut World, cell: (i32, i32)| {
            spawn::shape(world, ShapeSpec::new(ShapeKind::Rect, Rgb::GRAY).at(cell).with_tag(Tag::WALL))
        };
        for x in 0..cols {
            wall(world, (x, 0))?;
            wall(world, (x, rows - 1))?;
        }
        for y in 1..rows - 1 {
            wall(world, (0, y))?;
            wall(world, (cols - 1, y))?;
        }

        let hero = spawn::actor(world, ActorSpec::new("hero").at((1, 1)).with_tag("player"))?;
        movement::speed(world, hero, 6.0)?;
        input::keys(
            world,
            hero,
            KeyMover::new(KeyScheme::default()).with_precondition(player_physics()),
            KeyDirection::Down,
        )?;

        spawn::fill(world, 0.12, |world, cell| wall(world, cell))?;

        let collected = world.resource::<Statistics>().get("coins").unwrap_or(0.0);
        score::score(world, collected, ScoreOptions::new().with_prefix("Coins:").with_color(Rgb::WHITE))?;
        input::register_key(world, "p", KeyDirection::Down, |world| {
            if game::is_paused(world) {
                game::resume(world);
            } else {
                game::pause(world);
            }
        });

        for _ in 0..COINS_PER_ROUND {
            let coin = spawn::shape(world, ShapeSpec::new(ShapeKind::Circle, Rgb::YELLOW).with_size(0.6, 0.6).with_tag("coin"))?;
            effects::pulse(world, coin, 0.8, Some(0.8))?;
            input::collides(world, coin, &[hero], |world, coin, _| {
                spawn::destroy(world, coin);
                world.resource_mut::<Statistics>().add("coins", 1.0);
                if let Err(e) = score::score(world, 1.0, ScoreOptions::new()) {
                    log::warn!("unable to update score: {}", e);
                }
            })?;
        }

        for _ in 0..self.round {
            let ghost = spawn::actor(world, ActorSpec::new("ghost").with_tag("enemy"))?;
            movement::speed(world, ghost, 2.0)?;
            effects::wander(world, ghost, WanderPolicy::track_astar(&["player"], 0.05), 1.0)?;
            input::collides(world, ghost, &[hero], |world, _, hero| {
                if actor::is_alive(world, hero) {
                    if let Err(e) = actor::kill(world, hero, 1.0) {
                        log::warn!("unable to kill hero: {}", e);
                    }
                }
            })?;
        }

        spawn::text(world, TextSpec::new(format!("round {}", self.round), Rgb::WHITE).at(0.2, 0.1).with_size(0.7))?;
        Ok(())
    }

    fn completed(&self, world: &World) -> bool {
        world.resource::<Statistics>().get("coins").unwrap_or(0.0) >= self.goal
    }

    fn next(&mut self) -> Option<Box<dyn Level>> {
        Some(Box::new(Maze {
            round: self.round + 1,
            goal: self.goal + COINS_PER_ROUND as f64,
        }))
    }
}

fn sheet(prefix: &str, size: u32) -> FrameSet {
    let frames = |action: &str| {
        (0..2)
            .map(|i| ImageInfo::new(format!("{}_{}_{}", prefix, action, i), size, size))
            .collect::<Vec<_>>()
    };
    let mut set = FrameSet::new();
    for dir in ["left", "right", "front", "back"] {
        set.insert(format!("idle_{}", dir), frames(&format!("idle_{}", dir)));
        set.insert(format!("walk_{}", dir), frames(&format!("walk_{}", dir)));
    }
    set.insert("idle", frames("idle"));
    set.insert("die", frames("die"));
    set
}

fn color(c: Rgb) -> Color {
    Color::new(c.0, c.1, c.2, 255)
}

/// Images are not loaded in the demo; their key picks a colour.
fn image_color(key: &str) -> Color {
    if key.contains("_die_") {
        Color::DARKGRAY
    } else if key.starts_with("hero") {
        Color::SKYBLUE
    } else if key.starts_with("ghost") {
        Color::RED
    } else {
        Color::MAGENTA
    }
}

const KEYS: [(KeyboardKey, &str); 10] = [
    (KeyboardKey::KEY_RIGHT, "right"),
    (KeyboardKey::KEY_LEFT, "left"),
    (KeyboardKey::KEY_UP, "up"),
    (KeyboardKey::KEY_DOWN, "down"),
    (KeyboardKey::KEY_W, "w"),
    (KeyboardKey::KEY_A, "a"),
    (KeyboardKey::KEY_S, "s"),
    (KeyboardKey::KEY_D, "d"),
    (KeyboardKey::KEY_SPACE, "space"),
    (KeyboardKey::KEY_P, "p"),
];

fn poll_input(rl: &RaylibHandle) -> Vec<InputEvent> {
    let mut events = Vec::new();
    for (key, name) in KEYS {
        if rl.is_key_pressed(key) {
            events.push(InputEvent::KeyDown(name.to_string()));
        }
        if rl.is_key_released(key) {
            events.push(InputEvent::KeyUp(name.to_string()));
        }
    }
    let mouse = rl.get_mouse_position();
    let delta = rl.get_mouse_delta();
    if delta.x != 0.0 || delta.y != 0.0 {
        events.push(InputEvent::MouseMove { x: mouse.x, y: mouse.y });
    }
    for (button, id) in [
        (MouseButton::MOUSE_BUTTON_LEFT, 1),
        (MouseButton::MOUSE_BUTTON_MIDDLE, 2),
        (MouseButton::MOUSE_BUTTON_RIGHT, 3),
    ] {
        if rl.is_mouse_button_pressed(button) {
            events.push(InputEvent::MouseDown { button: id, x: mouse.x, y: mouse.y });
        }
    }
    events
}

fn start(sim: &mut Simulation) -> EngineResult<()> {
    sim.reset(ResetMode::Hard);
    sim.set_level(Box::new(Maze::first()))
}

fn run(cli: Cli) -> EngineResult<()> {
    let mut config = GameConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        log::warn!("{}, using defaults", e);
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let (width, height, fps, grid) = (config.width, config.height, config.fps, config.grid_size);

    let (mut rl, thread) = raylib::init()
        .size(width as i32, height as i32)
        .title(&config.title)
        .build();
    rl.set_target_fps(fps);

    let assets = MemoryAssets::new()
        .with_actor("hero", sheet("hero", 64))
        .with_actor("ghost", sheet("ghost", 64));
    let mut sim = Simulation::with_assets(config, assets);
    start(&mut sim)?;

    while !rl.window_should_close() {
        for event in poll_input(&rl) {
            sim.handle_input(event);
        }
        sim.tick(rl.get_frame_time())?;
        if spawn::entities_with_tag(&mut sim.world, "player").is_empty() {
            log::info!("hero lost, starting over");
            start(&mut sim)?;
        }

        let items = sim.draw_list();
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        for item in items {
            let r = item.rect;
            let (x, y, w, h) = (r.x as i32, r.y as i32, r.w as i32, r.h as i32);
            match &item.visual {
                Visual::Shape { kind, color: c, outline } => {
                    let c = color(*c);
                    match (kind, outline) {
                        (ShapeKind::Rect, 0) => d.draw_rectangle(x, y, w, h, c),
                        (ShapeKind::Rect, _) => d.draw_rectangle_lines(x, y, w, h, c),
                        (ShapeKind::Circle, _) => d.draw_circle(x + w / 2, y + h / 2, r.w / 2.0, c),
                        (ShapeKind::Ellipse, _) => d.draw_ellipse(x + w / 2, y + h / 2, r.w / 2.0, r.h / 2.0, c),
                    }
                }
                Visual::Image(key) => {
                    let rec = Rectangle::new(r.x + r.w / 2.0, r.y + r.h / 2.0, r.w, r.h);
                    let origin = Vector2::new(r.w / 2.0, r.h / 2.0);
                    d.draw_rectangle_pro(rec, origin, item.angle, image_color(key));
                }
                Visual::Text { text, color: c } => d.draw_text(text, x, y, h.max(1), color(*c)),
            }
        }
        if cli.grid {
            let g = grid as i32;
            for x in (0..width as i32).step_by(g.max(1) as usize) {
                d.draw_line(x, 0, x, height as i32, Color::DARKGRAY);
            }
            for y in (0..height as i32).step_by(g.max(1) as usize) {
                d.draw_line(0, y, width as i32, y, Color::DARKGRAY);
            }
        }
    }
    sim.teardown();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
