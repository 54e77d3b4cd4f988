//! Collision resolution.
//!
//! Two independent routines:
//! - [`solve_free_constraints`]: grid-bounded pairwise resolution among free
//!   bodies, followed by an explicit pass against large special obstacles
//!   (the active container, the held body and oversized free bodies).
//! - [`solve_contained_collisions`]: all-pairs resolution inside one
//!   container's captured set, followed by clamping into its interior.
//!
//! Both iterate in body insertion order, so the output for a given input is
//! reproducible.

use crate::body::Body;
use crate::config::SimConfig;
use crate::container::Container;
use crate::grid::Grid;
use crate::math::{separation, Vec2};
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub restitution: f32,
    pub density_damping: f32,
    pub contained_restitution: f32,
    /// Free bodies wider than one cell skip the grid pass.
    pub cell_size: f32,
}

impl From<&SimConfig> for SolverParams {
    fn from(config: &SimConfig) -> Self {
        Self {
            restitution: config.restitution,
            density_damping: config.density_damping,
            contained_restitution: config.contained_restitution,
            cell_size: config.cell_size as f32,
        }
    }
}

impl SolverParams {
    /// Restitution for a pair whose busier member has `neighbors` others nearby.
    pub fn density_restitution(&self, neighbors: usize) -> f32 {
        self.restitution / (1.0 + self.density_damping * neighbors as f32)
    }
}

/// Counters from one solver pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub pair_checks: usize,
    pub contacts: usize,
    pub obstacle_contacts: usize,
}

impl AddAssign for SolverStats {
    fn add_assign(&mut self, rhs: Self) {
        self.pair_checks += rhs.pair_checks;
        self.contacts += rhs.contacts;
        self.obstacle_contacts += rhs.obstacle_contacts;
    }
}

/// Immovable disc that free bodies are pushed out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

/// Resolve overlaps among free bodies, then against special obstacles.
///
/// `grid` must have been rebuilt from `bodies` after the last change to the
/// body list.
pub fn solve_free_constraints(
    bodies: &mut [Body],
    grid: &Grid,
    obstacles: &[Obstacle],
    params: &SolverParams,
) -> SolverStats {
    let mut stats = SolverStats::default();
    let n = bodies.len();
    let oversized = |body: &Body| 2.0 * body.radius() > params.cell_size;

    // Neighbor counts are taken once, before anything moves
    let density: Vec<usize> = (0..n)
        .map(|i| {
            grid.body_cell(i)
                .map(|cell| grid.neighbor_count(cell).saturating_sub(1))
                .unwrap_or(0)
        })
        .collect();

    for a in 0..n {
        let Some(cell) = grid.body_cell(a) else {
            continue;
        };
        if oversized(&bodies[a]) {
            continue;
        }
        for b in grid.neighbors_of(cell) {
            if b <= a || oversized(&bodies[b]) {
                continue;
            }
            stats.pair_checks += 1;
            let restitution = params.density_restitution(density[a].max(density[b]));
            if resolve_pair(bodies, a, b, restitution) {
                stats.contacts += 1;
            }
        }
    }

    stats += solve_special_obstacles(bodies, obstacles, params);
    stats
}

/// Grid-independent pass: oversized free bodies against every other free
/// body, then every free body against each kinematic obstacle.
fn solve_special_obstacles(
    bodies: &mut [Body],
    obstacles: &[Obstacle],
    params: &SolverParams,
) -> SolverStats {
    let mut stats = SolverStats::default();
    let n = bodies.len();

    let big: Vec<usize> = (0..n)
        .filter(|&i| bodies[i].is_free() && 2.0 * bodies[i].radius() > params.cell_size)
        .collect();
    for &a in &big {
        for b in 0..n {
            if b == a || !bodies[b].is_free() {
                continue;
            }
            // Two oversized bodies are paired once, from the lower index
            if b < a && big.contains(&b) {
                continue;
            }
            stats.pair_checks += 1;
            if resolve_pair(bodies, a, b, params.restitution) {
                stats.obstacle_contacts += 1;
            }
        }
    }

    for obstacle in obstacles {
        for body in bodies.iter_mut().filter(|b| b.is_free()) {
            if push_out_of(body, obstacle, params.restitution) {
                stats.obstacle_contacts += 1;
            }
        }
    }
    stats
}

/// Resolve collisions inside one container and clamp members to its interior.
///
/// `members` are indices into `bodies`. Each member's `contained_offset` is
/// rewritten from its final position.
pub fn solve_contained_collisions(
    bodies: &mut [Body],
    members: &[usize],
    container: &Container,
    params: &SolverParams,
) -> SolverStats {
    let mut stats = SolverStats::default();

    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            stats.pair_checks += 1;
            if resolve_pair(bodies, a, b, params.contained_restitution) {
                stats.contacts += 1;
            }
        }
    }

    for &index in members {
        let body = &mut bodies[index];
        let max_distance = (container.radius - body.radius()).max(0.0);
        let (normal, distance) = separation(container.center, body.position);
        if distance > max_distance {
            body.position = container.center + normal * max_distance;
            stats.obstacle_contacts += 1;
        }
        body.contained_offset = body.position - container.center;
    }
    stats
}

/// Separate bodies `a` and `b` if they overlap. Returns whether they did.
///
/// Position correction is split by inverse mass. Velocities are corrected
/// only when the pair is approaching along the contact normal.
fn resolve_pair(bodies: &mut [Body], a: usize, b: usize, restitution: f32) -> bool {
    let (normal, distance) = separation(bodies[a].position, bodies[b].position);
    let overlap = bodies[a].radius() + bodies[b].radius() - distance;
    if overlap <= 0.0 {
        return false;
    }

    let inv_a = bodies[a].inverse_mass();
    let inv_b = bodies[b].inverse_mass();
    let inv_total = inv_a + inv_b;

    let correction = normal * (overlap / inv_total);
    bodies[a].position -= correction * inv_a;
    bodies[b].position += correction * inv_b;

    let approach = (bodies[b].velocity - bodies[a].velocity).dot(normal);
    if approach < 0.0 {
        let impulse = -(1.0 + restitution) * approach / inv_total;
        bodies[a].velocity -= normal * (impulse * inv_a);
        bodies[b].velocity += normal * (impulse * inv_b);
    }
    true
}

fn push_out_of(body: &mut Body, obstacle: &Obstacle, restitution: f32) -> bool {
    let (normal, distance) = separation(obstacle.center, body.position);
    let reach = obstacle.radius + body.radius();
    if distance >= reach {
        return false;
    }
    body.position = obstacle.center + normal * reach;

    let inward = body.velocity.dot(normal);
    if inward < 0.0 {
        body.velocity -= normal * ((1.0 + restitution) * inward);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyId;

    const EPS: f32 = 1e-3;

    fn params() -> SolverParams {
        SolverParams::from(&SimConfig::default())
    }

    fn free(id: u64, x: f32, y: f32, radius: f32) -> Body {
        Body::new(BodyId(id), Vec2::new(x, y), radius, radius.max(100.0))
    }

    fn solve(bodies: &mut [Body], obstacles: &[Obstacle]) -> SolverStats {
        let mut grid = Grid::new(80);
        grid.rebuild(bodies);
        solve_free_constraints(bodies, &grid, obstacles, &params())
    }

    #[test]
    fn equal_bodies_separate_in_one_pass() {
        // overlap = 20 - 15 = 5
        let mut bodies = vec![free(0, 100.0, 100.0, 10.0), free(1, 115.0, 100.0, 10.0)];
        let stats = solve(&mut bodies, &[]);

        assert_eq!(stats.contacts, 1);
        let distance = bodies[0].position.distance(bodies[1].position);
        assert!(distance >= 20.0 - EPS, "distance {distance}");
        // Equal masses share the correction
        assert!((bodies[0].position.x - 97.5).abs() < EPS);
        assert!((bodies[1].position.x - 117.5).abs() < EPS);
    }

    #[test]
    fn heavier_body_moves_less() {
        let mut bodies = vec![free(0, 100.0, 100.0, 30.0), free(1, 135.0, 100.0, 10.0)];
        solve(&mut bodies, &[]);
        let heavy_shift = (bodies[0].position.x - 100.0).abs();
        let light_shift = (bodies[1].position.x - 135.0).abs();
        assert!(heavy_shift < light_shift);
        assert!(bodies[0].position.distance(bodies[1].position) >= 40.0 - EPS);
    }

    #[test]
    fn grazing_pair_is_untouched() {
        let mut bodies = vec![free(0, 100.0, 100.0, 10.0), free(1, 120.0, 100.0, 10.0)];
        bodies[0].velocity = Vec2::new(10.0, 0.0);
        let stats = solve(&mut bodies, &[]);
        assert_eq!(stats.contacts, 0);
        assert_eq!(bodies[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(bodies[0].velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn approaching_pair_loses_normal_velocity() {
        let mut bodies = vec![free(0, 100.0, 100.0, 10.0), free(1, 118.0, 100.0, 10.0)];
        bodies[0].velocity = Vec2::new(50.0, 0.0);
        bodies[1].velocity = Vec2::new(-50.0, 0.0);
        solve(&mut bodies, &[]);

        let closing = bodies[0].velocity.x - bodies[1].velocity.x;
        assert!(closing <= 0.0, "still closing at {closing}");
        // Inelastic: relative speed after is below the 100 before
        assert!(closing.abs() < 100.0);
    }

    #[test]
    fn coincident_centers_still_separate() {
        let mut bodies = vec![free(0, 200.0, 200.0, 10.0), free(1, 200.0, 200.0, 10.0)];
        solve(&mut bodies, &[]);
        assert!(bodies[0].position.distance(bodies[1].position) >= 20.0 - EPS);
        assert!(bodies[0].position.is_finite() && bodies[1].position.is_finite());
    }

    #[test]
    fn denser_neighborhood_lowers_restitution() {
        let p = params();
        assert_eq!(p.density_restitution(0), p.restitution);
        assert!(p.density_restitution(8) < p.density_restitution(2));
    }

    #[test]
    fn free_body_is_pushed_out_of_obstacle() {
        let obstacle = Obstacle {
            center: Vec2::new(400.0, 400.0),
            radius: 150.0,
        };
        let mut bodies = vec![free(0, 450.0, 400.0, 15.0)];
        bodies[0].velocity = Vec2::new(-100.0, 0.0);
        let stats = solve(&mut bodies, &[obstacle]);

        assert_eq!(stats.obstacle_contacts, 1);
        let distance = bodies[0].position.distance(obstacle.center);
        assert!((distance - 165.0).abs() < EPS);
        assert!(bodies[0].velocity.x >= 0.0);
    }

    #[test]
    fn oversized_free_body_resolves_across_cells() {
        // A freshly released body at radius 100 spans more than one 80 unit cell
        let mut big = free(0, 400.0, 400.0, 15.0);
        big.begin_hold(0.0);
        big.release(Vec2::ZERO, 3.0);
        assert_eq!(big.radius(), 100.0);
        let mut bodies = vec![big, free(1, 400.0 + 105.0, 400.0, 15.0)];

        let stats = solve(&mut bodies, &[]);
        assert_eq!(stats.obstacle_contacts, 1);
        let distance = bodies[0].position.distance(bodies[1].position);
        assert!(distance >= 115.0 - EPS);
    }

    #[test]
    fn contained_bodies_stay_inside_container() {
        let container = Container::new(Vec2::new(300.0, 300.0), 50.0);
        let mut bodies = vec![
            free(0, 300.0, 300.0, 15.0),
            free(1, 360.0, 300.0, 15.0),
            free(2, 300.0, 200.0, 15.0),
        ];
        for body in &mut bodies {
            let offset = body.position - container.center;
            body.begin_contain(offset, 15.0, 1.0);
        }

        let stats = solve_contained_collisions(&mut bodies, &[0, 1, 2], &container, &params());
        assert_eq!(stats.pair_checks, 3);
        for body in &bodies {
            let distance = body.position.distance(container.center);
            assert!(distance <= container.radius - body.radius() + EPS);
            assert_eq!(body.contained_offset, body.position - container.center);
        }
    }

    #[test]
    fn empty_container_is_a_no_op() {
        let container = Container::new(Vec2::new(10.0, 10.0), 50.0);
        let mut bodies = vec![free(0, 500.0, 500.0, 15.0)];
        let stats = solve_contained_collisions(&mut bodies, &[], &container, &params());
        assert_eq!(stats, SolverStats::default());
        assert_eq!(bodies[0].position, Vec2::new(500.0, 500.0));
    }
}
