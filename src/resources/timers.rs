//! Timed callbacks.
//!
//! [`Timers`] holds callbacks due at a point of simulation time. They are
//! fired by [`update_timers`](crate::systems::time::update_timers) and
//! rescheduled according to their [`Repeat`].

use std::sync::Arc;

use bevy_ecs::prelude::*;

pub type TimerCallback = Arc<dyn Fn(&mut World) + Send + Sync>;

/// How many times a timed callback fires in total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    Times(u32),
    Forever,
}

impl Repeat {
    /// Remaining schedule after one firing, `None` when exhausted.
    fn after_fire(self) -> Option<Repeat> {
        match self {
            Repeat::Once | Repeat::Times(0) | Repeat::Times(1) => None,
            Repeat::Times(n) => Some(Repeat::Times(n - 1)),
            Repeat::Forever => Some(Repeat::Forever),
        }
    }
}

pub struct TimerEntry {
    pub callback: TimerCallback,
    /// Simulation time in seconds at which it fires.
    pub due: f32,
    pub wait: f32,
    pub repeat: Repeat,
}

#[derive(Resource, Default)]
pub struct Timers {
    entries: Vec<TimerEntry>,
}

impl Timers {
    /// Fire `callback` `wait` seconds after `now`.
    pub fn schedule(&mut self, now: f32, wait: f32, repeat: Repeat, callback: TimerCallback) {
        let wait = wait.max(0.0);
        self.entries.push(TimerEntry {
            callback,
            due: now + wait,
            wait,
            repeat,
        });
    }

    /// Remove the entries due at `now` and queue their follow-ups.
    /// Returns the callbacks to run, in scheduling order.
    pub fn take_due(&mut self, now: f32) -> Vec<TimerCallback> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries).into_iter().partition(|t| t.due <= now);
        self.entries = pending;
        let mut out = Vec::with_capacity(due.len());
        for entry in due {
            if let Some(repeat) = entry.repeat.after_fire() {
                self.entries.push(TimerEntry {
                    callback: entry.callback.clone(),
                    due: now + entry.wait,
                    wait: entry.wait,
                    repeat,
                });
            }
            out.push(entry.callback);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
