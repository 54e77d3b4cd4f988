//! The owned simulation context
//!
//! [`Simulation`] holds every piece of mutable state: bodies, the spatial
//! grid, the interaction controller, the clock and the seeded RNG. Nothing is
//! global, so any number of simulations can run side by side.

use crate::body::{Body, BodyId};
use crate::commands::SimCommand;
use crate::config::{SimConfig, MAX_THROW_MULTIPLIER};
use crate::error::{PlacementError, SimError};
use crate::grid::Grid;
use crate::integrator::{enforce_bounds, integrate, Bounds, IntegratorParams, WallParams};
use crate::interaction::{InteractionController, PointerInput};
use crate::math::Vec2;
use crate::snapshot::{BodyInstance, BodySnapshot, ContainerSnapshot};
use crate::solver::{solve_contained_collisions, solve_free_constraints, SolverParams, SolverStats};
use crate::spawn::{find_free_spot, SpawnRegion};
use crate::time::SimulationClock;
use ballpit_metrics::PhaseProfiler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Frames of history kept per profiled phase.
const PROFILE_WINDOW: usize = 120;

pub struct Simulation {
    config: SimConfig,
    bodies: Vec<Body>,
    next_id: u64,
    grid: Grid,
    controller: InteractionController,
    clock: SimulationClock,
    rng: StdRng,
    integrator: IntegratorParams,
    walls: WallParams,
    solver: SolverParams,
    last_stats: SolverStats,
    profiler: PhaseProfiler,
}

impl Simulation {
    /// Validate `config` and scatter the initial population over the window.
    ///
    /// Placement stops early if the attempt budget runs out; the simulation
    /// then starts with fewer bodies than requested.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        if config.throw_multiplier > MAX_THROW_MULTIPLIER {
            tracing::warn!(
                requested = config.throw_multiplier,
                cap = MAX_THROW_MULTIPLIER,
                "throw multiplier capped"
            );
        }

        let mut sim = Self {
            bodies: Vec::with_capacity(config.initial_bodies),
            next_id: 0,
            grid: Grid::new(config.cell_size),
            controller: InteractionController::new(&config),
            clock: SimulationClock::new(),
            rng: StdRng::seed_from_u64(config.seed),
            integrator: IntegratorParams::from(&config),
            walls: WallParams::from(&config),
            solver: SolverParams::from(&config),
            last_stats: SolverStats::default(),
            profiler: PhaseProfiler::new(PROFILE_WINDOW),
            config,
        };
        sim.place_initial_bodies();
        Ok(sim)
    }

    fn place_initial_bodies(&mut self) {
        let radius = self.config.base_radius;
        let region = SpawnRegion::window(self.config.width, self.config.height, radius);
        let mut attempts = 0;
        while self.bodies.len() < self.config.initial_bodies
            && attempts < self.config.initial_placement_attempts
        {
            attempts += 1;
            if let Some(spot) = find_free_spot(&self.bodies, None, radius, region, 1, &mut self.rng) {
                self.spawn_at(spot);
            }
        }
        if self.bodies.len() < self.config.initial_bodies {
            tracing::warn!(
                placed = self.bodies.len(),
                requested = self.config.initial_bodies,
                attempts,
                "initial placement ran out of attempts"
            );
        } else {
            tracing::info!(bodies = self.bodies.len(), attempts, "initial bodies placed");
        }
    }

    fn spawn_at(&mut self, position: Vec2) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body::new(
            id,
            position,
            self.config.base_radius,
            self.config.enlarged_radius,
        ));
        id
    }

    /// Advance the simulation by `dt` seconds using one pointer sample.
    ///
    /// Order: size transitions, interaction, integration, grid rebuild,
    /// free-body constraints, container constraints, walls.
    pub fn step(&mut self, dt: f32, pointer: PointerInput) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let Self {
            config,
            bodies,
            grid,
            controller,
            clock,
            rng,
            integrator,
            walls,
            solver,
            last_stats,
            profiler,
            ..
        } = self;

        for body in bodies.iter_mut() {
            body.advance_size(dt, config.size_curve);
        }
        clock.advance(dt);
        let now = clock.elapsed();

        profiler.time_phase("interaction", || {
            controller.update(now, dt, &pointer, bodies, config, rng)
        });
        profiler.time_phase("integrate", || integrate(bodies, dt, integrator));
        profiler.time_phase("grid", || grid.rebuild(bodies));

        let stats = profiler.time_phase("solve", || {
            let obstacles = controller.obstacles(bodies);
            let mut stats = solve_free_constraints(bodies, grid, &obstacles, solver);
            if let Some(container) = controller.container() {
                let members = controller.container_members(bodies);
                stats += solve_contained_collisions(bodies, &members, container, solver);
            }
            stats
        });
        *last_stats = stats;

        let bounds = Bounds::new(config.width, config.height);
        profiler.time_phase("bounds", || enforce_bounds(bodies, bounds, walls));
    }

    /// Render view of every body, in insertion order.
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies.iter().map(BodySnapshot::from).collect()
    }

    pub fn container_snapshot(&self) -> Option<ContainerSnapshot> {
        self.controller.container().map(ContainerSnapshot::from)
    }

    /// GPU-ready instance data, one entry per body.
    pub fn instances(&self) -> Vec<BodyInstance> {
        self.bodies
            .iter()
            .map(|body| BodyInstance::from(&BodySnapshot::from(body)))
            .collect()
    }

    /// Adopt new window bounds.
    ///
    /// Free bodies that no longer fit, or that sit within
    /// `resize_floor_margin` of the new floor, are moved to a random open
    /// slot in the top band. Bodies that found no slot and every non-free
    /// body are clamped inside.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            tracing::warn!(width, height, "ignoring degenerate resize");
            return;
        }
        self.config.width = width;
        self.config.height = height;
        let bounds = Bounds::new(width, height);

        let mut repositioned = 0;
        for index in 0..self.bodies.len() {
            let body = &self.bodies[index];
            let radius = body.radius();
            let inside = bounds.contains_circle(body.position, radius);
            let near_floor =
                body.is_free() && body.position.y > height - self.config.resize_floor_margin;
            if inside && !near_floor {
                continue;
            }
            let spot = if body.is_free() {
                let region = SpawnRegion::top_band(width, height, radius, self.config.spawn_band);
                find_free_spot(
                    &self.bodies,
                    Some(index),
                    radius,
                    region,
                    self.config.reposition_attempts,
                    &mut self.rng,
                )
            } else {
                None
            };
            let body = &mut self.bodies[index];
            match spot {
                Some(position) => {
                    body.position = position;
                    repositioned += 1;
                }
                None => body.position = bounds.clamp_center(body.position, radius),
            }
        }
        tracing::info!(width, height, repositioned, "window resized");
    }

    /// Spawn one body in the top band without overlapping anything.
    pub fn add_body(&mut self) -> Result<BodyId, PlacementError> {
        let attempts = self.config.placement_attempts;
        let radius = self.config.base_radius;
        let region = SpawnRegion::top_band(
            self.config.width,
            self.config.height,
            radius,
            self.config.spawn_band,
        );
        match find_free_spot(&self.bodies, None, radius, region, attempts, &mut self.rng) {
            Some(spot) => {
                let id = self.spawn_at(spot);
                tracing::debug!(body = %id, x = spot.x, y = spot.y, "spawned body");
                Ok(id)
            }
            None => {
                tracing::warn!(attempts, "no room to spawn a body");
                Err(PlacementError::CouldNotPlace { attempts })
            }
        }
    }

    /// Spawn up to `count` bodies, stopping at the first placement failure.
    /// Returns how many were added.
    pub fn add_bodies(&mut self, count: usize) -> usize {
        let added = (0..count).take_while(|_| self.add_body().is_ok()).count();
        tracing::info!(added, requested = count, total = self.bodies.len(), "added bodies");
        added
    }

    /// Remove a body, releasing any hold or capture on it.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Body, SimError> {
        let index = self
            .bodies
            .iter()
            .position(|b| b.id == id)
            .ok_or(SimError::UnknownBody(id))?;
        self.controller.forget(id);
        Ok(self.bodies.remove(index))
    }

    /// Remove up to `count` bodies chosen uniformly at random.
    pub fn remove_random_bodies(&mut self, count: usize) -> usize {
        let count = count.min(self.bodies.len());
        let chosen: Vec<BodyId> =
            rand::seq::index::sample(&mut self.rng, self.bodies.len(), count)
                .into_iter()
                .map(|index| self.bodies[index].id)
                .collect();
        let removed = chosen
            .into_iter()
            .filter(|&id| self.remove_body(id).is_ok())
            .count();
        tracing::info!(removed, total = self.bodies.len(), "removed bodies");
        removed
    }

    /// Add a random impulse to every free body.
    pub fn scatter(&mut self) {
        let force = self.config.scatter_force;
        let mut scattered = 0;
        for body in self.bodies.iter_mut().filter(|b| b.is_free()) {
            let angle = self.rng.gen_range(0.0..TAU);
            let magnitude = self.rng.gen_range(0.5..1.5) * force;
            body.velocity += Vec2::from_angle(angle) * magnitude;
            scattered += 1;
        }
        tracing::debug!(scattered, "scatter");
    }

    pub fn apply(&mut self, command: SimCommand) {
        match command {
            SimCommand::Scatter => self.scatter(),
            SimCommand::AddBodies { count } => {
                self.add_bodies(count);
            }
            SimCommand::RemoveBodies { count } => {
                self.remove_random_bodies(count);
            }
            SimCommand::Resize { width, height } => self.on_resize(width, height),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn held(&self) -> Option<BodyId> {
        self.controller.held()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Counters from the most recent step's solver passes.
    pub fn last_stats(&self) -> SolverStats {
        self.last_stats
    }

    pub fn profiler(&self) -> &PhaseProfiler {
        &self.profiler
    }

    pub fn profiler_mut(&mut self) -> &mut PhaseProfiler {
        &mut self.profiler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyState;
    use crate::time::TICK_SECONDS;

    fn small_config(bodies: usize) -> SimConfig {
        SimConfig {
            initial_bodies: bodies,
            ..SimConfig::default()
        }
    }

    fn no_overlaps(sim: &Simulation) -> bool {
        let bodies = sim.bodies();
        bodies.iter().enumerate().all(|(i, a)| {
            bodies[i + 1..]
                .iter()
                .all(|b| a.position.distance(b.position) >= a.radius() + b.radius() - 1e-3)
        })
    }

    #[test]
    fn initial_bodies_are_placed_without_overlap() {
        let sim = Simulation::new(small_config(100)).unwrap();
        assert_eq!(sim.len(), 100);
        assert!(no_overlaps(&sim));
        let bounds = Bounds::new(800.0, 800.0);
        assert!(sim.bodies().iter().all(|b| bounds.contains_circle(b.position, b.radius())));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig {
            base_radius: -1.0,
            ..SimConfig::default()
        };
        assert!(matches!(Simulation::new(config), Err(SimError::Config(_))));
    }

    #[test]
    fn bodies_fall_and_come_to_rest_on_the_floor() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        for _ in 0..600 {
            sim.step(TICK_SECONDS, PointerInput::default());
        }
        let body = &sim.bodies()[0];
        assert_eq!(body.position.y, 800.0 - body.radius());
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(sim.clock().tick_count(), 600);
    }

    #[test]
    fn resize_lifts_bodies_resting_near_the_floor() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        for _ in 0..600 {
            sim.step(TICK_SECONDS, PointerInput::default());
        }
        assert_eq!(sim.bodies()[0].position.y, 785.0);

        sim.on_resize(800.0, 800.0);
        let body = &sim.bodies()[0];
        assert!(body.position.y <= 15.0 + 100.0, "still at {}", body.position.y);
    }

    #[test]
    fn resize_leaves_bodies_clear_of_the_floor() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        let before = sim.bodies()[0].position;
        sim.on_resize(800.0, before.y + 150.0 + 20.0);
        assert_eq!(sim.bodies()[0].position, before);
    }

    #[test]
    fn add_body_spawns_in_top_band() {
        let mut sim = Simulation::new(small_config(0)).unwrap();
        let id = sim.add_body().unwrap();
        let body = sim.body(id).unwrap();
        assert!(body.position.y <= 15.0 + 100.0);
        assert_eq!(sim.add_bodies(19), 19);
        assert_eq!(sim.len(), 20);
        assert!(no_overlaps(&sim));
    }

    #[test]
    fn add_body_fails_when_band_is_full() {
        let config = SimConfig {
            width: 30.0,
            height: 30.0,
            initial_bodies: 1,
            placement_attempts: 50,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        assert_eq!(sim.len(), 1);
        assert_eq!(sim.add_body(), Err(PlacementError::CouldNotPlace { attempts: 50 }));
        assert_eq!(sim.add_bodies(5), 0);
    }

    #[test]
    fn removing_held_body_releases_the_hold() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        let target = sim.bodies()[0].clone();
        sim.step(TICK_SECONDS, PointerInput::at(target.position).with_primary(true));
        assert_eq!(sim.held(), Some(target.id));

        let removed = sim.remove_body(target.id).unwrap();
        assert_eq!(removed.id, target.id);
        assert_eq!(sim.held(), None);
        assert_eq!(sim.remove_body(target.id).unwrap_err(), SimError::UnknownBody(target.id));
        sim.step(TICK_SECONDS, PointerInput::at(target.position));
    }

    #[test]
    fn held_body_reaches_full_size_after_one_second_of_ticks() {
        let mut sim = Simulation::new(small_config(1)).unwrap();
        let target = sim.bodies()[0].clone();
        let grab = PointerInput::at(target.position).with_primary(true);

        // The press tick starts the transition; the next 60 ticks advance it
        sim.step(TICK_SECONDS, grab);
        for _ in 0..60 {
            sim.step(TICK_SECONDS, grab);
        }
        let held = sim.body(target.id).unwrap();
        assert_eq!(held.radius(), 100.0);
        assert!(held.transition().is_none());

        sim.step(TICK_SECONDS, PointerInput::at(target.position));
        assert_eq!(sim.held(), None);
        for _ in 0..179 {
            sim.step(TICK_SECONDS, PointerInput::default());
        }
        assert!(sim.body(target.id).unwrap().radius() > 15.0);
        sim.step(TICK_SECONDS, PointerInput::default());
        let released = sim.body(target.id).unwrap();
        assert_eq!(released.radius(), 15.0);
        assert!(released.transition().is_none());
    }

    #[test]
    fn remove_random_bodies_caps_at_population() {
        let mut sim = Simulation::new(small_config(10)).unwrap();
        assert_eq!(sim.remove_random_bodies(4), 4);
        assert_eq!(sim.len(), 6);
        assert_eq!(sim.remove_random_bodies(20), 6);
        assert!(sim.is_empty());
        sim.step(TICK_SECONDS, PointerInput::default());
    }

    #[test]
    fn scatter_only_moves_free_bodies() {
        let mut sim = Simulation::new(small_config(20)).unwrap();
        let target = sim.bodies()[0].clone();
        sim.step(TICK_SECONDS, PointerInput::at(target.position).with_primary(true));
        sim.scatter();
        for body in sim.bodies() {
            if body.id == target.id {
                assert_eq!(body.state(), BodyState::Held);
                assert_eq!(body.velocity, Vec2::ZERO);
            } else {
                assert!(body.speed() >= 0.5 * 500.0 - 50.0);
            }
        }
    }

    #[test]
    fn commands_dispatch() {
        let mut sim = Simulation::new(small_config(5)).unwrap();
        sim.apply(SimCommand::AddBodies { count: 3 });
        assert_eq!(sim.len(), 8);
        sim.apply(SimCommand::RemoveBodies { count: 2 });
        assert_eq!(sim.len(), 6);
        sim.apply(SimCommand::Resize {
            width: 400.0,
            height: 300.0,
        });
        assert_eq!(sim.config().width, 400.0);
        assert_eq!(sim.config().height, 300.0);
    }

    #[test]
    fn container_lifecycle_through_step() {
        let mut sim = Simulation::new(small_config(200)).unwrap();
        let center = Vec2::new(400.0, 400.0);
        sim.step(TICK_SECONDS, PointerInput::at(center).with_secondary(true));
        let captured = sim.container_snapshot().map(|c| c.captured).unwrap_or(0);
        assert!(captured > 0);
        assert_eq!(
            sim.snapshot()
                .iter()
                .filter(|s| s.category == crate::snapshot::BodyCategory::Contained)
                .count(),
            captured
        );

        sim.step(TICK_SECONDS, PointerInput::at(center));
        assert!(sim.container_snapshot().is_none());
        assert!(sim.bodies().iter().all(Body::is_free));
    }

    #[test]
    fn instances_match_snapshot() {
        let sim = Simulation::new(small_config(12)).unwrap();
        let instances = sim.instances();
        let snapshot = sim.snapshot();
        assert_eq!(instances.len(), snapshot.len());
        assert_eq!(instances[3].position, snapshot[3].position.to_array());
    }
}
