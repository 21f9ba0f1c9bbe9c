//! ECS components for sprites.
//!
//! Submodules overview:
//! - [`actor`] – directional frame sets, action resolution and the actor state machine
//! - [`collision`] – collision callback rules checked every tick
//! - [`movement`] – waypoint queue, preconditions and keyboard movement schemes
//! - [`pointer`] – click handlers and mouse following
//! - [`sprite`] – geometry, visual and animatable attributes of every sprite
//! - [`stats`] – health, energy and wealth of actors
//! - [`tag`] – category label and optional name

pub mod actor;
pub mod collision;
pub mod movement;
pub mod pointer;
pub mod sprite;
pub mod stats;
pub mod tag;
