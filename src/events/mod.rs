//! Event types and observers used by the engine.
//!
//! Submodules:
//! - [`collision`] – overlap notifications from the collision detector
//! - [`input`] – key and mouse events from the host
pub mod collision;
pub mod input;
