//! Per-tick presentation state resolution
//!
//! Locomotion sensors come in, one `PresentationState` goes out. Explicit
//! `set_state` calls and one-shot locks take precedence over detection.

pub mod sensors;
pub mod sprint;
pub mod state;

pub use sensors::LocomotionSensors;
pub use sprint::{sprint_direction, SprintThresholds};
pub use state::{Decision, RejectReason, Resolution, ResolverTimings, StateResolver, Transition};
