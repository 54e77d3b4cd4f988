//! Non-overlapping placement of new or displaced bodies

use crate::body::Body;
use crate::math::Vec2;
use rand::Rng;

/// Axis-aligned region that candidate centers are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRegion {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnRegion {
    /// Whole window, inset by `radius`.
    pub fn window(width: f32, height: f32, radius: f32) -> Self {
        Self {
            min: Vec2::splat(radius),
            max: Vec2::new(width - radius, height - radius),
        }
    }

    /// Band of height `band` along the top edge, inset by `radius`.
    pub fn top_band(width: f32, height: f32, radius: f32, band: f32) -> Self {
        Self {
            min: Vec2::splat(radius),
            max: Vec2::new(width - radius, (radius + band).min(height - radius)),
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            sample_axis(rng, self.min.x, self.max.x),
            sample_axis(rng, self.min.y, self.max.y),
        )
    }
}

fn sample_axis<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        (lo + hi) * 0.5
    }
}

/// Draw up to `attempts` centers from `region` and return the first whose
/// circle of `radius` overlaps no body in `bodies` (other than `skip`).
pub fn find_free_spot<R: Rng>(
    bodies: &[Body],
    skip: Option<usize>,
    radius: f32,
    region: SpawnRegion,
    attempts: usize,
    rng: &mut R,
) -> Option<Vec2> {
    (0..attempts).map(|_| region.sample(rng)).find(|&candidate| {
        bodies.iter().enumerate().all(|(index, other)| {
            Some(index) == skip
                || candidate.distance(other.position) >= radius + other.radius()
        })
    })
}
