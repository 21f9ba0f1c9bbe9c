//! ECS resources shared by the whole simulation.
//!
//! Overview
//! - `animations` – live animations, tween specs and completion actions
//! - `assetstore` – asset provider interface and its cache
//! - `gameconfig` – window, grid and engine settings loaded from INI
//! - `grid` – spatial grid rebuilt every tick and its queries
//! - `inventory` – things, inventories and the tag-keyed registry
//! - `keybindings` – key callbacks and the pressed key
//! - `rng` – seedable random source
//! - `runstate` – pause and game-over flags
//! - `scoreboard` – corner scoreboards and their modes
//! - `statistics` – named counters
//! - `timers` – delayed and repeating callbacks
//! - `worldtime` – simulation time and delta
pub mod animations;
pub mod assetstore;
pub mod gameconfig;
pub mod grid;
pub mod inventory;
pub mod keybindings;
pub mod rng;
pub mod runstate;
pub mod scoreboard;
pub mod statistics;
pub mod timers;
pub mod worldtime;
