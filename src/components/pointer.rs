//! Mouse-driven components.

use std::sync::Arc;

use bevy_ecs::prelude::*;

/// `(world, clicked entity)`.
pub type ClickCallback = Arc<dyn Fn(&mut World, Entity) + Send + Sync>;

/// Click callbacks per mouse button. Buttons follow the usual numbering:
/// 1 left, 2 middle, 3 right.
#[derive(Component, Default)]
pub struct ClickHandlers {
    pub handlers: Vec<(u8, ClickCallback)>,
}

impl ClickHandlers {
    pub fn add(&mut self, button: u8, callback: ClickCallback) {
        self.handlers.push((button, callback));
    }

    pub fn for_button(&self, button: u8) -> impl Iterator<Item = ClickCallback> + '_ {
        self.handlers
            .iter()
            .filter(move |(b, _)| *b == button)
            .map(|(_, cb)| cb.clone())
    }
}

/// Sprites that recentre on the mouse cursor.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Follow;
