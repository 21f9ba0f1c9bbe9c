//! Engine systems.
//!
//! One tick runs, in order:
//! - [`tween::advance_animations`] – interpolate animated attributes
//! - [`animation::run_defenders`] – per-tick actor self-defense hooks
//! - [`animation::actor_frames`] – show and advance actor frames
//! - [`collision::collision_detector`] – overlap checks and event emission
//! - [`time::update_timers`] – timed callbacks
//! - [`time::update_scoreboards`] – timer scoreboards and their goals
//! - [`tween::flush_animations`] – completions of finished animations
//! - [`grid::register_grid`] – rebuild the spatial grid

pub mod animation;
pub mod collision;
pub mod grid;
pub mod time;
pub mod tween;
