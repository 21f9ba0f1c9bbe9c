//! Keyboard callback registry.
//!
//! One callback per `(key, direction)`: registering again overwrites. The
//! set of currently pressed keys is tracked here as well so that held-key
//! movement can re-issue itself.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

/// Edge a key callback fires on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum KeyDirection {
    #[default]
    Down,
    Up,
}

pub type KeyCallback = Arc<dyn Fn(&mut World) + Send + Sync>;

#[derive(Resource, Default)]
pub struct KeyBindings {
    callbacks: FxHashMap<(String, KeyDirection), KeyCallback>,
    pressed: Vec<String>,
}

impl KeyBindings {
    pub fn register(&mut self, key: impl Into<String>, direction: KeyDirection, callback: KeyCallback) {
        self.callbacks.insert((key.into(), direction), callback);
    }

    pub fn callback(&self, key: &str, direction: KeyDirection) -> Option<KeyCallback> {
        self.callbacks.get(&(key.to_string(), direction)).cloned()
    }

    pub fn is_bound(&self, key: &str, direction: KeyDirection) -> bool {
        self.callbacks.contains_key(&(key.to_string(), direction))
    }

    /// A new press replaces every key held so far.
    pub fn press(&mut self, key: &str) {
        self.pressed.clear();
        self.pressed.push(key.to_string());
    }

    pub fn release(&mut self, key: &str) {
        self.pressed.retain(|k| k != key);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
        self.pressed.clear();
    }
}
