//! Ballpit Core
//!
//! Real-time 2D disc simulation:
//! - Free bodies under gravity with grid-accelerated collision resolution
//! - Pointer interaction (hold and throw, capture into a sloshing container)
//! - Time-driven size transitions
//! - Owned, seeded [`Simulation`] context with render snapshots

pub mod body;
pub mod commands;
pub mod config;
pub mod container;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod interaction;
pub mod math;
pub mod simulation;
pub mod snapshot;
pub mod solver;
pub mod spawn;
pub mod time;

pub use glam;

pub use body::{Body, BodyId, BodyState};
pub use commands::SimCommand;
pub use config::{SimConfig, SizeCurve};
pub use error::{ConfigError, PlacementError, SimError};
pub use interaction::PointerInput;
pub use simulation::Simulation;
pub use snapshot::{BodyCategory, BodyInstance, BodySnapshot, ContainerSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
