//! Bodies and their behavioral state
//!
//! A [`Body`] carries its physical state plus two independent machines:
//! the interaction state ([`BodyState`]) and an optional radius
//! transition ([`SizeTransition`]). Holding or capturing a body starts a
//! growth; releasing it starts a shrink that keeps running while the body
//! flies free.

use crate::config::SizeCurve;
use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable body handle. Ids are never reused within a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyState {
    Free,
    Held,
    Contained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTransitionKind {
    Growing,
    Shrinking,
}

/// Slack when comparing accumulated time against a duration, so a whole
/// number of frames that nominally sums to the duration finishes on time.
const DURATION_EPSILON: f64 = 1e-6;

/// Time-driven radius interpolation from a snapshot of the starting size.
///
/// Elapsed time accumulates in f64; summing f32 frame times drifts short
/// of the duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeTransition {
    start_radius: f32,
    target_radius: f32,
    elapsed: f64,
    duration: f64,
}

impl SizeTransition {
    pub fn new(start_radius: f32, target_radius: f32, duration: f32) -> Self {
        Self {
            start_radius,
            target_radius,
            elapsed: 0.0,
            duration: f64::from(duration),
        }
    }

    pub fn kind(&self) -> SizeTransitionKind {
        if self.target_radius >= self.start_radius {
            SizeTransitionKind::Growing
        } else {
            SizeTransitionKind::Shrinking
        }
    }

    pub fn start_radius(&self) -> f32 {
        self.start_radius
    }

    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    /// Seconds since the transition started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration - DURATION_EPSILON
    }

    fn radius(&self, curve: SizeCurve) -> f32 {
        if self.is_finished() {
            return self.target_radius;
        }
        let w = curve.weight((self.elapsed / self.duration) as f32);
        self.start_radius + (self.target_radius - self.start_radius) * w
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    radius: f32,
    base_radius: f32,
    enlarged_radius: f32,
    state: BodyState,
    transition: Option<SizeTransition>,
    /// Offset from the container center; meaningful only while contained.
    pub contained_offset: Vec2,
}

impl Body {
    /// Free body at rest with `radius == base_radius`.
    pub fn new(id: BodyId, position: Vec2, base_radius: f32, enlarged_radius: f32) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            radius: base_radius,
            base_radius,
            enlarged_radius: enlarged_radius.max(base_radius),
            state: BodyState::Free,
            transition: None,
            contained_offset: Vec2::ZERO,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    pub fn enlarged_radius(&self) -> f32 {
        self.enlarged_radius
    }

    /// Mass proportional to disc area.
    pub fn mass(&self) -> f32 {
        self.radius * self.radius
    }

    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass()
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == BodyState::Free
    }

    pub fn transition(&self) -> Option<&SizeTransition> {
        self.transition.as_ref()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) < self.radius * self.radius
    }

    /// Attach to the pointer and start growing toward the enlarged size.
    pub fn begin_hold(&mut self, grow_duration: f32) {
        self.state = BodyState::Held;
        self.velocity = Vec2::ZERO;
        self.start_transition(self.enlarged_radius, grow_duration);
    }

    /// Join a container at `offset` from its center, resizing toward `target_radius`.
    pub fn begin_contain(&mut self, offset: Vec2, target_radius: f32, grow_duration: f32) {
        self.state = BodyState::Contained;
        self.contained_offset = offset;
        self.start_transition(target_radius, grow_duration);
    }

    /// Return to free flight with `velocity`, shrinking back to the base size.
    pub fn release(&mut self, velocity: Vec2, shrink_duration: f32) {
        self.state = BodyState::Free;
        self.velocity = velocity;
        self.contained_offset = Vec2::ZERO;
        self.start_transition(self.base_radius, shrink_duration);
    }

    /// Advance any radius transition by `dt` seconds.
    ///
    /// Once the duration has elapsed the radius equals the target exactly and
    /// the transition is cleared.
    pub fn advance_size(&mut self, dt: f32, curve: SizeCurve) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        transition.elapsed += f64::from(dt);
        let radius = transition.radius(curve);
        if transition.is_finished() {
            self.transition = None;
        }
        self.radius = radius.clamp(self.base_radius, self.enlarged_radius);
    }

    fn start_transition(&mut self, target: f32, duration: f32) {
        let target = target.clamp(self.base_radius, self.enlarged_radius);
        if duration <= 0.0 {
            self.radius = target;
            self.transition = None;
        } else {
            self.transition = Some(SizeTransition::new(self.radius, target, duration));
        }
    }
}

/// Slice indices of `ids`, in the order given. Unknown ids are skipped.
pub fn indices_of(bodies: &[Body], ids: &[BodyId]) -> Vec<usize> {
    if ids.is_empty() {
        return Vec::new();
    }
    let lookup: HashMap<BodyId, usize> = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| (body.id, index))
        .collect();
    ids.iter().filter_map(|id| lookup.get(id).copied()).collect()
}
