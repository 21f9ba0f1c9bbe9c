//! Pathfinding and movement policies.
//!
//! - [`astar`] – shortest 4-connected path around walls
//! - [`line`] – Bresenham lines and the `max_distance` fall limiter
//! - [`policies`] – `graze`, `track`, `track_astar` and the `player_physics` precondition

pub mod astar;
pub mod line;
pub mod policies;
