//! Sprint heading classification

use crate::core::config::CoordinatorConfig;
use crate::core::types::SprintDirection;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lateral input below this is stick noise, never a diagonal
const LATERAL_DEADZONE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprintThresholds {
    /// Axis magnitude counting as a cardinal heading
    pub cardinal: f32,
    /// Lateral magnitude counting as a diagonal
    pub diagonal: f32,
}

impl Default for SprintThresholds {
    fn default() -> Self {
        Self {
            cardinal: 0.3,
            diagonal: 0.5,
        }
    }
}

impl From<&CoordinatorConfig> for SprintThresholds {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            cardinal: config.sprint_cardinal_threshold,
            diagonal: config.sprint_diagonal_threshold,
        }
    }
}

/// Classify a sprint input vector (+y forward, +x right)
///
/// Diagonals win when the lateral axis passes the diagonal threshold and
/// there is any forward/backward component; otherwise the dominant
/// cardinal axis is used. A vector too small to classify sprints forward.
pub fn sprint_direction(input: Vec2, thresholds: &SprintThresholds) -> SprintDirection {
    use SprintDirection::*;

    if input.x.abs() >= thresholds.diagonal && input.y.abs() > LATERAL_DEADZONE {
        return match (input.y > 0.0, input.x < 0.0) {
            (true, true) => ForwardLeft,
            (true, false) => ForwardRight,
            (false, true) => BackwardLeft,
            (false, false) => BackwardRight,
        };
    }

    if input.y > thresholds.cardinal {
        Forward
    } else if input.y < -thresholds.cardinal {
        Backward
    } else if input.x < -thresholds.cardinal {
        StrafeLeft
    } else if input.x > thresholds.cardinal {
        StrafeRight
    } else {
        Forward
    }
}
