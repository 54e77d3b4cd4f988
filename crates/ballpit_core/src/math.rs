//! Vector math helpers
//!
//! Re-exports glam with the guarded normalization used by every solver

pub use glam::*;

/// Distance floor applied before dividing by a separation length.
pub const MIN_DISTANCE: f32 = 1e-4;

/// Direction used when two centers coincide and no normal can be derived.
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Unit normal pointing from `from` to `to`, and the distance between them.
///
/// Centers closer than [`MIN_DISTANCE`] yield [`FALLBACK_NORMAL`] and a
/// distance of zero, so coincident bodies still separate along a fixed axis.
pub fn separation(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    if distance < MIN_DISTANCE {
        (FALLBACK_NORMAL, 0.0)
    } else {
        (delta / distance, distance)
    }
}

/// Scale `v` down so its length never exceeds `max_len`.
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max_len * max_len && len_sq > 0.0 {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separation_of_coincident_points_uses_fallback() {
        let (normal, distance) = separation(Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0));
        assert_eq!(normal, FALLBACK_NORMAL);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn separation_is_unit_length() {
        let (normal, distance) = separation(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((normal.length() - 1.0).abs() < 1e-6);
        assert!((distance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn clamp_length_only_shrinks() {
        assert_eq!(clamp_length(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
        let clamped = clamp_length(Vec2::new(30.0, 40.0), 10.0);
        assert!((clamped.length() - 10.0).abs() < 1e-4);
    }
}
