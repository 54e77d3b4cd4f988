//! Velocity and position integration for free bodies, plus wall handling.
//!
//! Held bodies follow the pointer and contained bodies follow their
//! container, so both are skipped here.

use crate::body::Body;
use crate::config::SimConfig;
use crate::math::{clamp_length, Vec2};
use crate::time::TICK_SECONDS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorParams {
    pub gravity: f32,
    /// Velocity retained per 60 Hz tick.
    pub damping: f32,
    pub max_speed: f32,
    pub zero_threshold: f32,
}

impl From<&SimConfig> for IntegratorParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            gravity: config.gravity,
            damping: config.damping,
            max_speed: config.max_speed,
            zero_threshold: config.velocity_zero_threshold,
        }
    }
}

/// Semi-implicit Euler step: gravity, damping, speed cap, then position.
pub fn integrate(bodies: &mut [Body], dt: f32, params: &IntegratorParams) {
    if dt <= 0.0 {
        return;
    }
    let retained = params.damping.powf(dt / TICK_SECONDS);
    for body in bodies.iter_mut().filter(|b| b.is_free()) {
        let mut v = body.velocity + Vec2::new(0.0, params.gravity * dt);
        v = clamp_length(v * retained, params.max_speed);
        if v.length() < params.zero_threshold {
            v = Vec2::ZERO;
        }
        body.velocity = v;
        body.position += v * dt;
    }
}

/// Window rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a circle lies fully inside.
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= 0.0
            && center.x + radius <= self.width
            && center.y - radius >= 0.0
            && center.y + radius <= self.height
    }

    /// Nearest center keeping the circle inside; centered on an axis that is
    /// narrower than the circle.
    pub fn clamp_center(&self, center: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_axis(center.x, radius, self.width),
            clamp_axis(center.y, radius, self.height),
        )
    }
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent * 0.5
    } else {
        value.clamp(radius, extent - radius)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallParams {
    pub restitution: f32,
    pub floor_snap_speed: f32,
    pub floor_snap_tolerance: f32,
}

impl From<&SimConfig> for WallParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            restitution: config.wall_restitution,
            floor_snap_speed: config.floor_snap_speed,
            floor_snap_tolerance: config.floor_snap_tolerance,
        }
    }
}

/// Keep free bodies inside `bounds`, bouncing off walls and settling bodies
/// that rest on the floor.
pub fn enforce_bounds(bodies: &mut [Body], bounds: Bounds, params: &WallParams) {
    for body in bodies.iter_mut().filter(|b| b.is_free()) {
        let r = body.radius();
        let clamped = bounds.clamp_center(body.position, r);

        if clamped.x != body.position.x {
            let into_wall = (clamped.x - body.position.x) * body.velocity.x < 0.0;
            if into_wall {
                body.velocity.x = -body.velocity.x * params.restitution;
            }
        }
        if clamped.y != body.position.y {
            let into_wall = (clamped.y - body.position.y) * body.velocity.y < 0.0;
            if into_wall {
                body.velocity.y = -body.velocity.y * params.restitution;
            }
        }
        body.position = clamped;

        let floor = bounds.height - r;
        if body.position.y >= floor - params.floor_snap_tolerance
            && body.velocity.y.abs() < params.floor_snap_speed
        {
            body.position.y = floor.max(r);
            body.velocity.y = 0.0;
        }
    }
}
