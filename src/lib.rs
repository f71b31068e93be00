//! Action Coordinator - single authority over an agent's presentation state
//!
//! Locomotion sensors, per-limb action requests, one-shot transitions and
//! gestures all compete for one discrete state per tick. The coordinator
//! arbitrates them into a glitch-free stream for the animation layer.

pub mod arbiter;
pub mod coordinator;
pub mod core;
pub mod locks;
pub mod resolver;
pub mod script;
pub mod timing;

pub use crate::coordinator::{AnimationConsumer, Coordinator, Snapshot};
pub use crate::core::config::CoordinatorConfig;
pub use crate::core::error::{CoordinatorError, Result};
pub use crate::core::types::{
    ActionType, AgentId, Limb, PresentationState, SprintDirection, StateSource, Tick,
};
pub use crate::resolver::LocomotionSensors;
