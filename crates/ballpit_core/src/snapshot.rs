//! Read-only views of the simulation for renderers

use crate::body::{Body, BodyId, BodyState};
use crate::container::Container;
use crate::math::Vec2;
use serde::{Deserialize, Serialize};

/// Speed at which a free body is drawn fully red.
pub const MAX_SPEED_FOR_COLOR: f32 = 750.0;

const HELD_COLOR: [u8; 4] = [255, 255, 0, 255];
const CONTAINED_COLOR: [u8; 4] = [0, 160, 255, 255];
const RESTING_COLOR: [u8; 4] = [0, 255, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyCategory {
    Free,
    Held,
    Contained,
}

impl From<BodyState> for BodyCategory {
    fn from(state: BodyState) -> Self {
        match state {
            BodyState::Free => BodyCategory::Free,
            BodyState::Held => BodyCategory::Held,
            BodyState::Contained => BodyCategory::Contained,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec2,
    pub radius: f32,
    pub category: BodyCategory,
    pub color: [u8; 4],
}

impl From<&Body> for BodySnapshot {
    fn from(body: &Body) -> Self {
        let category = BodyCategory::from(body.state());
        Self {
            id: body.id,
            position: body.position,
            radius: body.radius(),
            category,
            color: body_color(category, body.speed()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub center: Vec2,
    pub radius: f32,
    pub captured: usize,
}

impl From<&Container> for ContainerSnapshot {
    fn from(container: &Container) -> Self {
        Self {
            center: container.center,
            radius: container.radius,
            captured: container.len(),
        }
    }
}

/// Per-instance data laid out for direct upload to a GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyInstance {
    pub position: [f32; 2],
    pub radius: f32,
    pub category: u32,
    pub color: [u8; 4],
}

impl From<&BodySnapshot> for BodyInstance {
    fn from(snapshot: &BodySnapshot) -> Self {
        Self {
            position: snapshot.position.to_array(),
            radius: snapshot.radius,
            category: snapshot.category as u32,
            color: snapshot.color,
        }
    }
}

/// Held bodies are yellow, contained bodies blue. Free bodies blend from
/// green at rest to red at [`MAX_SPEED_FOR_COLOR`].
pub fn body_color(category: BodyCategory, speed: f32) -> [u8; 4] {
    match category {
        BodyCategory::Held => HELD_COLOR,
        BodyCategory::Contained => CONTAINED_COLOR,
        BodyCategory::Free if speed < 1.0 => RESTING_COLOR,
        BodyCategory::Free => {
            let ratio = (speed / MAX_SPEED_FOR_COLOR).min(1.0);
            [
                (255.0 * ratio) as u8,
                (255.0 * (1.0 - ratio)) as u8,
                0,
                255,
            ]
        }
    }
}
