//! Capture container and slosh motion

use crate::body::{Body, BodyId};
use crate::config::SimConfig;
use crate::math::Vec2;
use crate::time::TICK_SECONDS;
use rand::Rng;

/// Capture disc anchored to the pointer while the secondary button is down.
///
/// The captured set holds ids only; bodies stay owned by the simulation.
#[derive(Debug, Clone)]
pub struct Container {
    pub center: Vec2,
    pub radius: f32,
    active: bool,
    captured: Vec<BodyId>,
}

impl Container {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            active: true,
            captured: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Captured ids in capture order.
    pub fn captured(&self) -> &[BodyId] {
        &self.captured
    }

    pub fn len(&self) -> usize {
        self.captured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    pub fn holds(&self, id: BodyId) -> bool {
        self.captured.contains(&id)
    }

    pub fn covers(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) < self.radius * self.radius
    }

    pub fn capture(&mut self, id: BodyId) {
        if !self.holds(id) {
            self.captured.push(id);
        }
    }

    /// Drop `id` from the captured set; returns whether it was present.
    pub fn forget(&mut self, id: BodyId) -> bool {
        let before = self.captured.len();
        self.captured.retain(|&c| c != id);
        self.captured.len() != before
    }

    /// Deactivate and hand back every captured id.
    pub fn deactivate(&mut self) -> Vec<BodyId> {
        self.active = false;
        std::mem::take(&mut self.captured)
    }

    /// Jitter each member's offset, pull runaway offsets back toward the
    /// center, and place the member at `center + offset`.
    ///
    /// Positions may still poke past the rim; the contained solver clamps them.
    pub fn slosh<R: Rng>(
        &self,
        bodies: &mut [Body],
        members: &[usize],
        params: &SloshParams,
        dt: f32,
        rng: &mut R,
    ) {
        let scale = dt / TICK_SECONDS;
        let limit = params.threshold * self.radius;
        for &index in members {
            let body = &mut bodies[index];
            let jitter = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
            let mut offset = body.contained_offset + jitter * (params.jitter * scale);
            if offset.length() > limit {
                offset -= offset * (params.restoring * scale).min(1.0);
            }
            body.contained_offset = offset;
            body.position = self.center + offset;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SloshParams {
    pub jitter: f32,
    pub threshold: f32,
    pub restoring: f32,
}

impl From<&SimConfig> for SloshParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            jitter: config.slosh_jitter,
            threshold: config.slosh_threshold,
            restoring: config.slosh_restoring,
        }
    }
}
