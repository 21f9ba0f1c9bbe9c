//! Gridplay library.
//!
//! A small grid-based 2D game engine: sprites on a cell grid, tween
//! animations, directional actors, collisions and path-following movement.
//! Everything lives in one [`bevy_ecs::world::World`] owned by a
//! [`simulation::Simulation`]; operations in [`ops`] take the world
//! explicitly. Rendering, audio and input polling belong to the host.

pub mod components;
pub mod error;
pub mod events;
pub mod navigation;
pub mod ops;
pub mod resources;
pub mod simulation;
pub mod systems;
