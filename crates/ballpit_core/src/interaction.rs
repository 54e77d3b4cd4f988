//! Pointer-driven interaction: hold and throw, capture and slosh.
//!
//! The controller sees one [`PointerInput`] sample per frame and detects
//! button edges against the previous sample. Releases throw bodies with the
//! average pointer velocity over a trailing time window.

use crate::body::{indices_of, Body, BodyId};
use crate::config::SimConfig;
use crate::container::{Container, SloshParams};
use crate::math::Vec2;
use crate::solver::Obstacle;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Time spans shorter than this give no velocity estimate.
const MIN_SAMPLE_SPAN: f64 = 1e-4;

/// Raw pointer state for one frame. `position` is `None` when the pointer
/// is outside the window or the platform reported nothing usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub position: Option<Vec2>,
    pub primary: bool,
    pub secondary: bool,
}

impl PointerInput {
    pub fn at(position: Vec2) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn with_primary(mut self, down: bool) -> Self {
        self.primary = down;
        self
    }

    pub fn with_secondary(mut self, down: bool) -> Self {
        self.secondary = down;
        self
    }

    /// Position if present and finite.
    pub fn sanitized_position(&self) -> Option<Vec2> {
        self.position.filter(|p| p.is_finite())
    }
}

/// Trailing window of `(time, position)` pointer samples.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    window: f64,
    samples: VecDeque<(f64, Vec2)>,
}

impl PointerTracker {
    pub fn new(window: f32) -> Self {
        Self {
            window: f64::from(window),
            samples: VecDeque::new(),
        }
    }

    /// Add a sample and drop those older than the window.
    ///
    /// Non-finite positions are ignored. A timestamp earlier than the newest
    /// sample restarts the window.
    pub fn record(&mut self, time: f64, position: Vec2) {
        if !position.is_finite() || !time.is_finite() {
            return;
        }
        if self.samples.back().is_some_and(|&(last, _)| time < last) {
            self.samples.clear();
        }
        self.samples.push_back((time, position));

        let cutoff = time - self.window;
        while self.samples.front().is_some_and(|&(t, _)| t < cutoff) {
            self.samples.pop_front();
        }
    }

    /// Average velocity across the window, or zero without a usable span.
    pub fn velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Vec2::ZERO;
        };
        let span = t1 - t0;
        if span < MIN_SAMPLE_SPAN {
            return Vec2::ZERO;
        }
        (p1 - p0) / span as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Drives hold/contain/release transitions from pointer samples.
#[derive(Debug, Clone)]
pub struct InteractionController {
    tracker: PointerTracker,
    held: Option<BodyId>,
    container: Option<Container>,
    primary_down: bool,
    secondary_down: bool,
}

impl InteractionController {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            tracker: PointerTracker::new(config.pointer_window),
            held: None,
            container: None,
            primary_down: false,
            secondary_down: false,
        }
    }

    pub fn held(&self) -> Option<BodyId> {
        self.held
    }

    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    /// Velocity a release would apply right now.
    pub fn throw_velocity(&self, config: &SimConfig) -> Vec2 {
        self.tracker.velocity() * config.effective_throw_multiplier()
    }

    /// Apply one frame of pointer input at simulation time `now`.
    pub fn update<R: Rng>(
        &mut self,
        now: f64,
        dt: f32,
        pointer: &PointerInput,
        bodies: &mut [Body],
        config: &SimConfig,
        rng: &mut R,
    ) {
        let position = pointer.sanitized_position();
        if let Some(p) = position {
            self.tracker.record(now, p);
        }

        match (self.primary_down, pointer.primary) {
            (false, true) => {
                if let Some(p) = position {
                    self.grab(p, bodies, config);
                }
            }
            (true, false) => self.release_held(bodies, config),
            _ => {}
        }
        self.primary_down = pointer.primary;

        match (self.secondary_down, pointer.secondary) {
            (false, true) => {
                if let Some(p) = position {
                    self.open_container(p, bodies, config);
                }
            }
            (true, false) => self.close_container(bodies, config),
            _ => {}
        }
        self.secondary_down = pointer.secondary;

        if let (Some(id), Some(p)) = (self.held, position) {
            if let Some(body) = bodies.iter_mut().find(|b| b.id == id) {
                let r = body.radius();
                body.position = Vec2::new(
                    p.x.clamp(r, (config.width - r).max(r)),
                    p.y.clamp(r, (config.height - r).max(r)),
                );
                body.velocity = Vec2::ZERO;
            }
        }

        let velocity = self.tracker.velocity();
        if let Some(container) = self.container.as_mut() {
            if let Some(p) = position {
                container.center = p;
            }
            let members = indices_of(bodies, container.captured());
            container.slosh(bodies, &members, &SloshParams::from(config), dt, rng);
            for &index in &members {
                bodies[index].velocity = velocity;
            }
        }
    }

    /// Kinematic obstacles free bodies must stay out of this frame.
    pub fn obstacles(&self, bodies: &[Body]) -> Vec<Obstacle> {
        let mut obstacles = Vec::with_capacity(2);
        if let Some(container) = self.container.as_ref().filter(|c| c.is_active()) {
            obstacles.push(Obstacle {
                center: container.center,
                radius: container.radius,
            });
        }
        if let Some(body) = self.held.and_then(|id| bodies.iter().find(|b| b.id == id)) {
            obstacles.push(Obstacle {
                center: body.position,
                radius: body.radius(),
            });
        }
        obstacles
    }

    /// Indices of the active container's members, in capture order.
    pub fn container_members(&self, bodies: &[Body]) -> Vec<usize> {
        self.container
            .as_ref()
            .map(|c| indices_of(bodies, c.captured()))
            .unwrap_or_default()
    }

    /// Drop every reference to a body that is being removed.
    pub fn forget(&mut self, id: BodyId) {
        if self.held == Some(id) {
            self.held = None;
        }
        if let Some(container) = self.container.as_mut() {
            container.forget(id);
        }
    }

    fn grab(&mut self, point: Vec2, bodies: &mut [Body], config: &SimConfig) {
        if self.held.is_some() {
            return;
        }
        if let Some(body) = bodies.iter_mut().find(|b| b.is_free() && b.contains_point(point)) {
            body.begin_hold(config.grow_duration);
            self.held = Some(body.id);
            tracing::debug!(body = %body.id, "holding body");
        }
    }

    fn release_held(&mut self, bodies: &mut [Body], config: &SimConfig) {
        let Some(id) = self.held.take() else {
            return;
        };
        let throw = self.throw_velocity(config);
        if let Some(body) = bodies.iter_mut().find(|b| b.id == id) {
            body.release(throw, config.shrink_duration);
            tracing::debug!(body = %id, vx = throw.x, vy = throw.y, "threw held body");
        }
    }

    fn open_container(&mut self, center: Vec2, bodies: &mut [Body], config: &SimConfig) {
        if self.container.is_some() {
            return;
        }
        let mut container = Container::new(center, config.container_radius);
        for body in bodies.iter_mut().filter(|b| b.is_free()) {
            if container.covers(body.position) {
                let offset = body.position - center;
                body.begin_contain(offset, config.contained_radius, config.grow_duration);
                container.capture(body.id);
            }
        }
        tracing::debug!(captured = container.len(), "opened container");
        self.container = Some(container);
    }

    fn close_container(&mut self, bodies: &mut [Body], config: &SimConfig) {
        let Some(mut container) = self.container.take() else {
            return;
        };
        let throw = self.throw_velocity(config);
        let released = container.deactivate();
        for index in indices_of(bodies, &released) {
            bodies[index].release(throw, config.shrink_duration);
        }
        tracing::debug!(released = released.len(), vx = throw.x, vy = throw.y, "closed container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyState;
    use crate::config::MAX_THROW_MULTIPLIER;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f32 = 1e-3;

    fn tracked_line(velocity: Vec2) -> PointerTracker {
        let mut tracker = PointerTracker::new(0.5);
        let start = Vec2::new(100.0, 400.0);
        for i in 0..=30 {
            let t = i as f64 / 60.0;
            tracker.record(t, start + velocity * t as f32);
        }
        tracker
    }

    fn bodies() -> Vec<Body> {
        vec![
            Body::new(BodyId(0), Vec2::new(100.0, 100.0), 15.0, 100.0),
            Body::new(BodyId(1), Vec2::new(400.0, 400.0), 15.0, 100.0),
            Body::new(BodyId(2), Vec2::new(430.0, 400.0), 15.0, 100.0),
            Body::new(BodyId(3), Vec2::new(700.0, 700.0), 15.0, 100.0),
        ]
    }

    #[test]
    fn constant_motion_gives_its_velocity() {
        let v = Vec2::new(240.0, -120.0);
        let estimate = tracked_line(v).velocity();
        assert!((estimate - v).length() < EPS, "estimate {estimate}");
    }

    #[test]
    fn window_drops_old_samples() {
        let mut tracker = PointerTracker::new(0.5);
        tracker.record(0.0, Vec2::ZERO);
        tracker.record(0.25, Vec2::new(10.0, 0.0));
        tracker.record(1.0, Vec2::new(20.0, 0.0));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.velocity(), Vec2::ZERO);
    }

    #[test]
    fn degenerate_samples_fall_back_to_zero() {
        let mut tracker = PointerTracker::new(0.5);
        assert_eq!(tracker.velocity(), Vec2::ZERO);
        tracker.record(1.0, Vec2::new(5.0, 5.0));
        tracker.record(1.0, Vec2::new(50.0, 5.0));
        assert_eq!(tracker.velocity(), Vec2::ZERO);
        tracker.record(1.1, Vec2::new(f32::NAN, 0.0));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn throw_multiplier_is_capped_at_eight() {
        let v = Vec2::new(100.0, 0.0);
        let config = SimConfig {
            throw_multiplier: 12.0,
            ..SimConfig::default()
        };
        let mut controller = InteractionController::new(&config);
        controller.tracker = tracked_line(v);
        let thrown = controller.throw_velocity(&config);
        assert!((thrown - v * MAX_THROW_MULTIPLIER).length() < 0.01);
    }

    #[test]
    fn hold_then_release_throws_body() {
        let config = SimConfig {
            throw_multiplier: 2.0,
            ..SimConfig::default()
        };
        let mut controller = InteractionController::new(&config);
        let mut bodies = bodies();
        let mut rng = StdRng::seed_from_u64(3);
        let dt = 1.0 / 60.0;

        let press = PointerInput::at(Vec2::new(105.0, 100.0)).with_primary(true);
        controller.update(0.0, dt, &press, &mut bodies, &config, &mut rng);
        assert_eq!(controller.held(), Some(BodyId(0)));
        assert_eq!(bodies[0].state(), BodyState::Held);

        // Drag right at 60 px/s for half a second
        let mut now = 0.0;
        for i in 1..=30 {
            now = i as f64 * f64::from(dt);
            let p = Vec2::new(105.0 + 60.0 * now as f32, 100.0);
            controller.update(now, dt, &PointerInput::at(p).with_primary(true), &mut bodies, &config, &mut rng);
        }
        assert!((bodies[0].position.x - 135.0).abs() < EPS);

        // Release on the same line, so the window sees a constant 60 px/s
        let release_at = now + f64::from(dt);
        let up = PointerInput::at(Vec2::new(105.0 + 60.0 * release_at as f32, 100.0));
        controller.update(release_at, dt, &up, &mut bodies, &config, &mut rng);
        assert_eq!(controller.held(), None);
        assert_eq!(bodies[0].state(), BodyState::Free);
        let thrown = bodies[0].velocity;
        assert!((thrown.x - 120.0).abs() < 1e-2, "thrown {thrown}");
        assert!(thrown.y.abs() < 1e-2, "thrown {thrown}");
    }

    #[test]
    fn press_on_empty_space_holds_nothing() {
        let config = SimConfig::default();
        let mut controller = InteractionController::new(&config);
        let mut bodies = bodies();
        let mut rng = StdRng::seed_from_u64(3);
        let press = PointerInput::at(Vec2::new(250.0, 250.0)).with_primary(true);
        controller.update(0.0, 0.016, &press, &mut bodies, &config, &mut rng);
        assert_eq!(controller.held(), None);
        assert!(bodies.iter().all(Body::is_free));
    }

    #[test]
    fn container_captures_nearby_free_bodies_and_releases_them() {
        let config = SimConfig::default();
        let mut controller = InteractionController::new(&config);
        let mut bodies = bodies();
        let mut rng = StdRng::seed_from_u64(3);

        let press = PointerInput::at(Vec2::new(410.0, 410.0)).with_secondary(true);
        controller.update(0.0, 0.016, &press, &mut bodies, &config, &mut rng);

        let container = controller.container().expect("container opened");
        assert_eq!(container.captured(), &[BodyId(1), BodyId(2)]);
        assert_eq!(bodies[1].state(), BodyState::Contained);
        assert_eq!(bodies[3].state(), BodyState::Free);
        assert_eq!(controller.container_members(&bodies), vec![1, 2]);
        assert_eq!(controller.obstacles(&bodies).len(), 1);

        let up = PointerInput::at(Vec2::new(410.0, 410.0));
        controller.update(0.016, 0.016, &up, &mut bodies, &config, &mut rng);
        assert!(controller.container().is_none());
        assert!(bodies.iter().all(Body::is_free));
        assert!(bodies[1].transition().is_some());
    }

    #[test]
    fn empty_container_is_valid() {
        let config = SimConfig::default();
        let mut controller = InteractionController::new(&config);
        let mut bodies = bodies();
        let mut rng = StdRng::seed_from_u64(3);
        let press = PointerInput::at(Vec2::new(100.0, 700.0)).with_secondary(true);
        controller.update(0.0, 0.016, &press, &mut bodies, &config, &mut rng);
        assert!(controller.container().is_some_and(Container::is_empty));
        assert!(controller.container_members(&bodies).is_empty());
    }

    #[test]
    fn forgetting_held_body_clears_hold() {
        let config = SimConfig::default();
        let mut controller = InteractionController::new(&config);
        let mut bodies = bodies();
        let mut rng = StdRng::seed_from_u64(3);
        let press = PointerInput::at(Vec2::new(100.0, 100.0)).with_primary(true);
        controller.update(0.0, 0.016, &press, &mut bodies, &config, &mut rng);
        controller.forget(BodyId(0));
        assert_eq!(controller.held(), None);
        assert!(controller.obstacles(&bodies).is_empty());
    }
}
