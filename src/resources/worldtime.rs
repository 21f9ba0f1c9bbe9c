use bevy_ecs::prelude::Resource;

/// Simulation clock, advanced once per tick by
/// [`update_world_time`](crate::systems::time::update_world_time).
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Seconds since the simulation started or was last reset.
    pub elapsed: f32,
    /// Scaled seconds covered by the current tick.
    pub delta: f32,
    pub time_scale: f32,
    /// Ticks run so far.
    pub ticks: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            ticks: 0,
        }
    }
}

impl WorldTime {
    /// Current delta in milliseconds.
    pub fn delta_ms(&self) -> f32 {
        self.delta * 1000.0
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.delta = 0.0;
        self.ticks = 0;
    }
}
