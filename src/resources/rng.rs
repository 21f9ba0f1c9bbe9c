//! Seedable random source shared by every randomized operation.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub fastrand::Rng);

impl Default for SimRng {
    fn default() -> Self {
        SimRng(fastrand::Rng::new())
    }
}

impl SimRng {
    /// Deterministic generator. A seed of 0 picks a random seed.
    pub fn with_seed(seed: u64) -> Self {
        if seed == 0 {
            SimRng::default()
        } else {
            SimRng(fastrand::Rng::with_seed(seed))
        }
    }

    pub fn i32(&mut self, range: std::ops::Range<i32>) -> i32 {
        if range.is_empty() {
            return range.start;
        }
        self.0.i32(range)
    }

    pub fn usize(&mut self, range: std::ops::Range<usize>) -> usize {
        if range.is_empty() {
            return range.start;
        }
        self.0.usize(range)
    }

    /// Uniform in `[0, 1)`.
    pub fn f32(&mut self) -> f32 {
        self.0.f32()
    }

    /// `1` or `-1`, evenly.
    pub fn sign(&mut self) -> i32 {
        if self.0.bool() { 1 } else { -1 }
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        p > 0.0 && self.0.f32() < p
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        self.0.shuffle(items);
    }
}
