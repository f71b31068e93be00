//! Locomotion sensor snapshot polled once per tick

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Boolean locomotion signals plus the sprint input vector
///
/// Contradictory readings (e.g. grounded and falling) are accepted as-is;
/// the resolver always consults `grounded` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionSensors {
    pub grounded: bool,
    pub falling: bool,
    pub sliding: bool,
    pub diving: bool,
    /// Any directional movement key held
    pub movement_input: bool,
    /// Sprint modifier held
    pub sprint_input: bool,
    /// 2-axis sprint heading, +y forward, +x right
    pub sprint_vector: Vec2,
}

impl LocomotionSensors {
    /// Standing still on the ground
    pub fn grounded() -> Self {
        Self {
            grounded: true,
            ..Default::default()
        }
    }

    /// In the air, not yet descending
    pub fn airborne() -> Self {
        Self::default()
    }

    pub fn falling() -> Self {
        Self {
            falling: true,
            ..Default::default()
        }
    }

    pub fn with_movement(mut self) -> Self {
        self.movement_input = true;
        self
    }

    pub fn with_sprint(mut self, x: f32, y: f32) -> Self {
        self.movement_input = true;
        self.sprint_input = true;
        self.sprint_vector = Vec2::new(x, y);
        self
    }

    pub fn with_slide(mut self) -> Self {
        self.sliding = true;
        self
    }

    pub fn with_dive(mut self) -> Self {
        self.diving = true;
        self
    }

    /// Any input or motion the resolver could react to
    pub fn is_neutral(&self) -> bool {
        !(self.falling || self.sliding || self.diving || self.movement_input || self.sprint_input)
    }
}
