//! Pause and game-over flags.
//!
//! While the game is paused or over, [`Simulation::tick`](crate::simulation::Simulation::tick)
//! does not advance time or run the schedule. Input is still delivered, so
//! a key binding can resume a paused game.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunState {
    paused: bool,
    over: bool,
}

impl RunState {
    /// Returns whether the game was paused; a game that is over stays over.
    pub fn pause(&mut self) -> bool {
        if self.over || self.paused {
            return false;
        }
        self.paused = true;
        true
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn end(&mut self) {
        self.over = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Neither paused nor over.
    pub fn is_running(&self) -> bool {
        !self.paused && !self.over
    }
}
