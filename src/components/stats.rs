use bevy_ecs::prelude::Component;

pub const MAX_HEALTH: f32 = 100.0;
pub const MAX_ENERGY: f32 = 100.0;
pub const MAX_WEALTH: f32 = 500_000.0;

/// Result of [`Stats::set_health`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthChange {
    /// Out of range; health is unchanged.
    Rejected,
    Updated,
    /// Health just reached zero.
    Died,
}

/// Actor vitals.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    health: f32,
    energy: f32,
    wealth: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            health: MAX_HEALTH,
            energy: MAX_ENERGY,
            wealth: 500.0,
        }
    }
}

impl Stats {
    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn wealth(&self) -> f32 {
        self.wealth
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Accepts `0 <= value < 100`; anything else is ignored.
    pub fn set_health(&mut self, value: f32) -> HealthChange {
        if !(0.0..MAX_HEALTH).contains(&value) {
            return HealthChange::Rejected;
        }
        let was_alive = self.is_alive();
        self.health = value;
        if was_alive && !self.is_alive() {
            HealthChange::Died
        } else {
            HealthChange::Updated
        }
    }

    /// Additive, clamped to `[0, 100]`.
    pub fn add_energy(&mut self, delta: f32) -> f32 {
        self.energy = (self.energy + delta).clamp(0.0, MAX_ENERGY);
        self.energy
    }

    /// Additive, clamped above at [`MAX_WEALTH`] only.
    pub fn add_wealth(&mut self, delta: f32) -> f32 {
        self.wealth = (self.wealth + delta).min(MAX_WEALTH);
        self.wealth
    }

    /// Raw restore used by persistence; values are taken as saved.
    pub fn restore(&mut self, health: Option<f32>, energy: Option<f32>, wealth: Option<f32>) {
        if let Some(h) = health {
            self.health = h;
        }
        if let Some(e) = energy {
            self.energy = e;
        }
        if let Some(w) = wealth {
            self.wealth = w;
        }
    }
}
