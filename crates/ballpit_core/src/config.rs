//! Simulation configuration
//!
//! Every tunable lives in [`SimConfig`]. Units are pixels and seconds with
//! +y pointing down, matching window coordinates.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Upper bound applied to [`SimConfig::throw_multiplier`].
pub const MAX_THROW_MULTIPLIER: f32 = 8.0;

/// Interpolation law for radius transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCurve {
    #[default]
    Linear,
    /// Hermite ease-in/ease-out (`3t² - 2t³`).
    SmoothStep,
}

impl SizeCurve {
    /// Map elapsed fraction `t` in `[0, 1]` to interpolation weight in `[0, 1]`.
    pub fn weight(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            SizeCurve::Linear => t,
            SizeCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // World
    pub width: f32,
    pub height: f32,
    pub initial_bodies: usize,
    pub seed: u64,

    // Body sizes and transitions
    pub base_radius: f32,
    pub enlarged_radius: f32,
    /// Growth target for captured bodies, within `[base_radius, enlarged_radius]`.
    pub contained_radius: f32,
    pub grow_duration: f32,
    pub shrink_duration: f32,
    pub size_curve: SizeCurve,

    // Integration
    pub gravity: f32,
    /// Velocity retained per 60 Hz tick.
    pub damping: f32,
    pub max_speed: f32,
    pub velocity_zero_threshold: f32,
    pub floor_snap_speed: f32,
    pub floor_snap_tolerance: f32,
    pub wall_restitution: f32,

    // Collision
    pub cell_size: i32,
    pub restitution: f32,
    /// Restitution falloff per neighbor in the 3x3 cell block.
    pub density_damping: f32,
    pub contained_restitution: f32,

    // Container
    pub container_radius: f32,
    /// Max per-axis offset jitter per 60 Hz tick.
    pub slosh_jitter: f32,
    /// Fraction of the container radius beyond which offsets are pulled back.
    pub slosh_threshold: f32,
    /// Fraction of the offset removed per 60 Hz tick once past the threshold.
    pub slosh_restoring: f32,

    // Interaction
    pub throw_multiplier: f32,
    pub pointer_window: f32,
    pub scatter_force: f32,

    // Placement
    pub spawn_band: f32,
    pub placement_attempts: usize,
    pub initial_placement_attempts: usize,
    pub reposition_attempts: usize,
    /// Free bodies closer than this to the floor after a resize are
    /// moved back to the top band.
    pub resize_floor_margin: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            initial_bodies: 500,
            seed: 0x5eed,

            base_radius: 15.0,
            enlarged_radius: 100.0,
            contained_radius: 20.0,
            grow_duration: 1.0,
            shrink_duration: 3.0,
            size_curve: SizeCurve::Linear,

            gravity: 500.0,
            damping: 0.98,
            max_speed: 1500.0,
            velocity_zero_threshold: 0.1,
            floor_snap_speed: 5.0,
            floor_snap_tolerance: 1.0,
            wall_restitution: 0.2,

            cell_size: 80,
            restitution: 0.5,
            density_damping: 0.15,
            contained_restitution: 0.2,

            container_radius: 150.0,
            slosh_jitter: 2.0,
            slosh_threshold: 0.5,
            slosh_restoring: 0.1,

            throw_multiplier: 1.0,
            pointer_window: 0.5,
            scatter_force: 500.0,

            spawn_band: 100.0,
            placement_attempts: 1000,
            initial_placement_attempts: 10_000,
            reposition_attempts: 100,
            resize_floor_margin: 150.0,
        }
    }
}

impl SimConfig {
    /// Check every field; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("base_radius", self.base_radius),
            ("enlarged_radius", self.enlarged_radius),
            ("contained_radius", self.contained_radius),
            ("grow_duration", self.grow_duration),
            ("shrink_duration", self.shrink_duration),
            ("max_speed", self.max_speed),
            ("container_radius", self.container_radius),
            ("pointer_window", self.pointer_window),
        ] {
            positive(field, value)?;
        }
        if self.cell_size <= 0 {
            return Err(ConfigError::NotPositive {
                field: "cell_size",
                value: self.cell_size as f32,
            });
        }

        for (field, value) in [
            ("damping", self.damping),
            ("wall_restitution", self.wall_restitution),
            ("restitution", self.restitution),
            ("contained_restitution", self.contained_restitution),
            ("slosh_threshold", self.slosh_threshold),
            ("slosh_restoring", self.slosh_restoring),
        ] {
            in_range(field, value, 0.0, 1.0)?;
        }
        for (field, value) in [
            ("gravity", self.gravity),
            ("velocity_zero_threshold", self.velocity_zero_threshold),
            ("floor_snap_speed", self.floor_snap_speed),
            ("floor_snap_tolerance", self.floor_snap_tolerance),
            ("density_damping", self.density_damping),
            ("slosh_jitter", self.slosh_jitter),
            ("throw_multiplier", self.throw_multiplier),
            ("scatter_force", self.scatter_force),
            ("spawn_band", self.spawn_band),
            ("resize_floor_margin", self.resize_floor_margin),
        ] {
            in_range(field, value, 0.0, f32::MAX)?;
        }

        if self.base_radius > self.enlarged_radius {
            return Err(ConfigError::RadiusOrder {
                base: self.base_radius,
                enlarged: self.enlarged_radius,
            });
        }
        in_range(
            "contained_radius",
            self.contained_radius,
            self.base_radius,
            self.enlarged_radius,
        )?;

        let required = 2.0 * self.base_radius;
        if (self.cell_size as f32) < required {
            return Err(ConfigError::CellTooSmall {
                cell_size: self.cell_size,
                required,
            });
        }

        // Any body can be captured at its enlarged size
        if self.enlarged_radius >= self.container_radius {
            return Err(ConfigError::ContainerTooSmall {
                container: self.container_radius,
                enlarged: self.enlarged_radius,
            });
        }
        Ok(())
    }

    /// Throw multiplier after applying [`MAX_THROW_MULTIPLIER`].
    pub fn effective_throw_multiplier(&self) -> f32 {
        self.throw_multiplier.clamp(0.0, MAX_THROW_MULTIPLIER)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
