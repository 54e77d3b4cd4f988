use crate::body::BodyId;
use thiserror::Error;

/// Rejected simulation configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("'{field}' must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("'{field}' must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("base radius {base} exceeds enlarged radius {enlarged}")]
    RadiusOrder { base: f32, enlarged: f32 },

    #[error("cell size {cell_size} is smaller than a body diameter ({required})")]
    CellTooSmall { cell_size: i32, required: f32 },

    #[error("container radius {container} cannot hold a body of enlarged radius {enlarged}")]
    ContainerTooSmall { container: f32, enlarged: f32 },
}

/// A new body could not be placed without overlapping existing ones.
#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    #[error("could not place a body after {attempts} attempts")]
    CouldNotPlace { attempts: usize },
}

/// Errors surfaced by [`crate::Simulation`].
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no body with id {0}")]
    UnknownBody(BodyId),
}
