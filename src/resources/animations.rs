//! Attribute animations and the set of animations in flight.
//!
//! An [`Animation`] snapshots the starting value of each attribute it drives
//! when it is scheduled, then interpolates toward the targets as time
//! advances. Animations hold the target entity by handle only; if the entity
//! disappears the animation is finished without running its completion.
//!
//! Time flows through a [`TimeBias`]. [`TimeBias::Gravity`] adds a constant
//! `acceleration * mass` seconds on every advance, so heavy sprites finish
//! sooner. [`TimeBias::Custom`] lets the caller supply the increment.
//!
//! # Lifecycle
//!
//! 1. [`AnimationSet::schedule`] creates the animation from a [`TweenSpec`].
//! 2. [`advance_animations`](crate::systems::tween::advance_animations)
//!    calls [`Animation::advance`] once per tick.
//! 3. [`flush_animations`](crate::systems::tween::flush_animations) removes
//!    finished animations and runs their [`Completion`] if the target still
//!    exists.

use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::components::sprite::Attribute;

/// Durations below this are raised to it.
pub const MIN_DURATION: f32 = 0.00001;

/// Abort snaps to the target once progress passes this percentage.
pub const SNAP_PROGRESS: f32 = 50.0;

/// Deferred work run against the world with the entity it concerns.
pub type EntityCallback = Box<dyn FnOnce(&mut World, Entity) + Send + Sync>;

/// Anything an [`Animation`] can drive.
pub trait Animatable {
    fn attribute(&self, attribute: Attribute) -> f32;
    fn set_attribute(&mut self, attribute: Attribute, value: f32);
    /// Weight used by [`TimeBias::Gravity`].
    fn mass(&self) -> f32 {
        1.0
    }
}

/// How wall-clock time maps onto animation time.
#[derive(Clone, Copy, Debug, Default)]
pub enum TimeBias {
    #[default]
    Linear,
    /// Adds `acceleration * mass` seconds per advance.
    Gravity { acceleration: f32 },
    /// `f(delta_seconds, mass)` returns the animation time to add.
    Custom(fn(f32, f32) -> f32),
}

impl TimeBias {
    /// Animation seconds to add for a step of `delta_s` wall-clock seconds.
    pub fn step(&self, delta_s: f32, mass: f32) -> f32 {
        match self {
            TimeBias::Linear => delta_s,
            TimeBias::Gravity { acceleration } => delta_s + acceleration * mass,
            TimeBias::Custom(f) => f(delta_s, mass),
        }
    }
}

/// What happens once an animation has been flushed.
#[derive(Default)]
pub enum Completion {
    #[default]
    None,
    Callback(EntityCallback),
    /// Despawn the target.
    Destroy,
    /// A movement step ended: revert to idle, run the optional callback,
    /// then continue any waypoint queue.
    MoveFinished(Option<EntityCallback>),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::None => write!(f, "None"),
            Completion::Callback(_) => write!(f, "Callback"),
            Completion::Destroy => write!(f, "Destroy"),
            Completion::MoveFinished(cb) => write!(f, "MoveFinished({})", cb.is_some()),
        }
    }
}

/// Builder for a new animation.
#[derive(Debug, Default)]
pub struct TweenSpec {
    pub duration: f32,
    pub targets: SmallVec<[(Attribute, f32); 2]>,
    pub abortable: bool,
    pub bias: TimeBias,
    pub completion: Completion,
}

impl TweenSpec {
    pub fn new(duration: f32) -> Self {
        TweenSpec {
            duration,
            ..Default::default()
        }
    }

    /// Drive `attribute` to `value`. Repeating an attribute replaces its target.
    pub fn with(mut self, attribute: Attribute, value: f32) -> Self {
        if let Some(slot) = self.targets.iter_mut().find(|(a, _)| *a == attribute) {
            slot.1 = value;
        } else {
            self.targets.push((attribute, value));
        }
        self
    }

    pub fn with_abortable(mut self, abortable: bool) -> Self {
        self.abortable = abortable;
        self
    }

    pub fn with_bias(mut self, bias: TimeBias) -> Self {
        self.bias = bias;
        self
    }

    pub fn with_completion(mut self, completion: Completion) -> Self {
        self.completion = completion;
        self
    }

    pub fn on_complete(self, callback: impl FnOnce(&mut World, Entity) + Send + Sync + 'static) -> Self {
        self.with_completion(Completion::Callback(Box::new(callback)))
    }
}

/// Opaque identifier of a scheduled animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub u64);

#[derive(Clone, Copy, Debug)]
struct Track {
    attribute: Attribute,
    start: f32,
    target: f32,
}

#[derive(Debug)]
pub struct Animation {
    pub id: AnimationId,
    pub target: Entity,
    tracks: SmallVec<[Track; 2]>,
    /// Animation time in seconds.
    elapsed: f32,
    duration: f32,
    abortable: bool,
    bias: TimeBias,
    finished: bool,
    completion: Completion,
}

impl Animation {
    pub fn new(id: AnimationId, target: Entity, obj: &impl Animatable, spec: TweenSpec) -> Self {
        let tracks = spec
            .targets
            .iter()
            .map(|&(attribute, target)| Track {
                attribute,
                start: obj.attribute(attribute),
                target,
            })
            .collect();
        let duration = if spec.duration.is_finite() && spec.duration > MIN_DURATION {
            spec.duration
        } else {
            MIN_DURATION
        };
        Animation {
            id,
            target,
            tracks,
            elapsed: 0.0,
            duration,
            abortable: spec.abortable,
            bias: spec.bias,
            finished: false,
            completion: spec.completion,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_abortable(&self) -> bool {
        self.abortable
    }

    /// Attributes this animation writes.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.tracks.iter().map(|t| t.attribute)
    }

    /// Advance by `delta_ms` milliseconds and write interpolated values.
    pub fn advance(&mut self, obj: &mut impl Animatable, delta_ms: f32) {
        if self.finished {
            return;
        }
        self.elapsed += self.bias.step(delta_ms / 1000.0, obj.mass());
        let mut n = self.elapsed / self.duration;
        if n >= 1.0 {
            self.finished = true;
            n = 1.0;
        }
        for track in &self.tracks {
            let value = if self.finished {
                track.target
            } else {
                track.start + (track.target - track.start) * n
            };
            obj.set_attribute(track.attribute, value);
        }
    }

    /// Percentage completed, the minimum over all tracks. Tracks heading to
    /// zero and tracks that do not move are left out, so an animation made
    /// only of those counts as complete.
    pub fn progress(&self, obj: &impl Animatable) -> f32 {
        self.tracks
            .iter()
            .filter(|t| t.target != 0.0 && (t.target - t.start).abs() > f32::EPSILON)
            .map(|t| ((obj.attribute(t.attribute) - t.start) / (t.target - t.start) * 100.0).abs())
            .fold(100.0, f32::min)
    }

    /// Force-finish an abortable animation. Past [`SNAP_PROGRESS`] the
    /// targets are written; otherwise values stay where they are.
    /// Returns whether the animation was aborted.
    pub fn abort(&mut self, obj: &mut impl Animatable) -> bool {
        if !self.abortable || self.finished {
            return false;
        }
        self.finished = true;
        if self.progress(obj) > SNAP_PROGRESS {
            for track in &self.tracks {
                obj.set_attribute(track.attribute, track.target);
            }
        }
        true
    }

    /// Finish without touching the target, used when it no longer exists.
    pub fn detach(&mut self) {
        self.finished = true;
    }

    pub fn take_completion(&mut self) -> Completion {
        std::mem::take(&mut self.completion)
    }
}

/// All animations in flight, in scheduling order.
#[derive(Resource, Debug, Default)]
pub struct AnimationSet {
    live: Vec<Animation>,
    next_id: u64,
}

impl AnimationSet {
    pub fn schedule(&mut self, target: Entity, obj: &impl Animatable, spec: TweenSpec) -> AnimationId {
        self.next_id += 1;
        let id = AnimationId(self.next_id);
        self.live.push(Animation::new(id, target, obj, spec));
        id
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.live.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.live.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        self.live.iter_mut()
    }

    /// Whether any unfinished animation targets `entity`.
    pub fn is_animating(&self, entity: Entity) -> bool {
        self.live.iter().any(|a| a.target == entity && !a.finished)
    }

    /// Remove and return finished animations, keeping the rest in order.
    pub fn take_finished(&mut self) -> Vec<Animation> {
        let (done, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.live).into_iter().partition(|a| a.finished);
        self.live = live;
        done
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[derive(Default)]
    struct Point {
        x: f32,
        y: f32,
        mass: f32,
    }

    impl Animatable for Point {
        fn attribute(&self, attribute: Attribute) -> f32 {
            match attribute {
                Attribute::X => self.x,
                Attribute::Y => self.y,
                _ => 0.0,
            }
        }
        fn set_attribute(&mut self, attribute: Attribute, value: f32) {
            match attribute {
                Attribute::X => self.x = value,
                Attribute::Y => self.y = value,
                _ => {}
            }
        }
        fn mass(&self) -> f32 {
            self.mass
        }
    }

    fn entity() -> Entity {
        World::new().spawn_empty().id()
    }

    #[test]
    fn linear_midpoint_and_end() {
        let mut p = Point { x: 2.0, ..Default::default() };
        let mut a = Animation::new(AnimationId(1), entity(), &p, TweenSpec::new(1.0).with(Attribute::X, 6.0));
        a.advance(&mut p, 500.0);
        assert!(approx_eq(p.x, 4.0));
        assert!(!a.is_finished());
        a.advance(&mut p, 500.0);
        assert!(approx_eq(p.x, 6.0));
        assert!(a.is_finished());
    }

    #[test]
    fn zero_duration_finishes_in_one_step() {
        let mut p = Point::default();
        let mut a = Animation::new(AnimationId(1), entity(), &p, TweenSpec::new(0.0).with(Attribute::Y, 3.0));
        assert!(approx_eq(a.duration(), MIN_DURATION));
        a.advance(&mut p, 1.0);
        assert!(a.is_finished());
        assert!(approx_eq(p.y, 3.0));
    }

    #[test]
    fn gravity_bias_scales_with_mass() {
        let mut p = Point { mass: 2.0, ..Default::default() };
        let spec = TweenSpec::new(1.0)
            .with(Attribute::X, 10.0)
            .with_bias(TimeBias::Gravity { acceleration: 0.1 });
        let mut a = Animation::new(AnimationId(1), entity(), &p, spec);
        a.advance(&mut p, 100.0);
        assert!(approx_eq(a.elapsed(), 0.3));
        assert!(approx_eq(p.x, 3.0));
    }

    #[test]
    fn abort_is_noop_when_not_abortable() {
        let mut p = Point::default();
        let mut a = Animation::new(AnimationId(1), entity(), &p, TweenSpec::new(1.0).with(Attribute::X, 4.0));
        a.advance(&mut p, 700.0);
        assert!(!a.abort(&mut p));
        assert!(!a.is_finished());
    }

    #[test]
    fn progress_is_minimum_over_tracks() {
        let mut p = Point::default();
        p.x = 1.0;
        let spec = TweenSpec::new(1.0).with(Attribute::X, 1.0).with(Attribute::Y, 4.0);
        let a = Animation::new(AnimationId(1), entity(), &p, spec);
        assert!(approx_eq(a.progress(&p), 0.0));
        p.y = 1.0;
        assert!(approx_eq(a.progress(&p), 25.0));
    }

    #[test]
    fn abort_toward_zero_snaps_to_target() {
        let mut p = Point { x: 4.0, ..Default::default() };
        let mut a = Animation::new(AnimationId(1), entity(), &p, TweenSpec::new(1.0).with(Attribute::X, 0.0).with_abortable(true));
        a.advance(&mut p, 100.0);
        assert!(approx_eq(p.x, 3.6));
        assert!(approx_eq(a.progress(&p), 100.0));
        assert!(a.abort(&mut p));
        assert!(approx_eq(p.x, 0.0));
    }

    #[test]
    fn zero_target_track_does_not_lower_progress() {
        let mut p = Point { x: 4.0, ..Default::default() };
        let spec = TweenSpec::new(1.0).with(Attribute::X, 0.0).with(Attribute::Y, 4.0).with_abortable(true);
        let mut a = Animation::new(AnimationId(1), entity(), &p, spec);
        a.advance(&mut p, 250.0);
        assert!(approx_eq(a.progress(&p), 25.0));
        assert!(a.abort(&mut p));
        assert!(approx_eq(p.x, 3.0));
        assert!(approx_eq(p.y, 1.0));
    }

    #[test]
    fn take_finished_keeps_order_of_live() {
        let p = Point::default();
        let mut set = AnimationSet::default();
        let e = entity();
        let a = set.schedule(e, &p, TweenSpec::new(1.0));
        let b = set.schedule(e, &p, TweenSpec::new(1.0));
        let c = set.schedule(e, &p, TweenSpec::new(1.0));
        if let Some(anim) = set.iter_mut().find(|x| x.id == b) {
            anim.detach();
        }
        let done = set.take_finished();
        assert_eq!(done.len(), 1);
        let ids: Vec<_> = set.iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
