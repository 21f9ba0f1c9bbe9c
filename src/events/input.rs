//! Input events delivered by the host.
//!
//! The host translates its own key and mouse events into [`InputEvent`]s and
//! hands them to [`Simulation::handle_input`](crate::simulation::Simulation::handle_input).
//! Any key press aborts every abortable animation before the key's callback
//! runs.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::trace;

use crate::components::pointer::{ClickHandlers, Follow};
use crate::components::sprite::{SpawnOrder, Sprite};
use crate::ops::effects;
use crate::resources::keybindings::{KeyBindings, KeyDirection};

/// Mouse coordinates are in pixels.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseDown { button: u8, x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
}

pub fn on_input(trigger: On<InputEvent>, mut commands: Commands) {
    let event = trigger.event().clone();
    commands.queue(move |world: &mut World| handle_input_event(world, &event));
}

pub fn handle_input_event(world: &mut World, event: &InputEvent) {
    trace!("input {:?}", event);
    match event {
        InputEvent::KeyDown(key) => {
            world.resource_mut::<KeyBindings>().press(key);
            effects::abort_all(world);
            let callback = world.resource::<KeyBindings>().callback(key, KeyDirection::Down);
            if let Some(cb) = callback {
                cb(world);
            }
        }
        InputEvent::KeyUp(key) => {
            world.resource_mut::<KeyBindings>().release(key);
            let callback = world.resource::<KeyBindings>().callback(key, KeyDirection::Up);
            if let Some(cb) = callback {
                cb(world);
            }
        }
        InputEvent::MouseDown { button, x, y } => {
            let mut hits = Vec::new();
            let mut query = world.query::<(Entity, &mut Sprite, &ClickHandlers, Option<&SpawnOrder>)>();
            for (entity, mut sprite, handlers, order) in query.iter_mut(world) {
                if !sprite.rect.contains_point(*x, *y) {
                    continue;
                }
                let callbacks: Vec<_> = handlers.for_button(*button).collect();
                if callbacks.is_empty() {
                    continue;
                }
                sprite.event_pos = Some((x / sprite.grid_size, y / sprite.grid_size));
                hits.push((SpawnOrder::key(order, entity), callbacks));
            }
            hits.sort_by_key(|(key, _)| *key);
            for ((_, entity), callbacks) in hits {
                for cb in callbacks {
                    cb(world, entity);
                }
            }
        }
        InputEvent::MouseMove { x, y } => {
            let mut query = world.query_filtered::<&mut Sprite, With<Follow>>();
            for mut sprite in query.iter_mut(world) {
                sprite.rect.x = x - sprite.rect.w / 2.0;
                sprite.rect.y = y - sprite.rect.h / 2.0;
            }
        }
    }
}
