//! Core type definitions used throughout the codebase

use crate::core::error::CoordinatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a coordinated agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame tick counter (coordinator time unit)
pub type Tick = u64;

/// One of the two independently actuated limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    Left,
    Right,
}

impl Limb {
    pub const ALL: [Limb; 2] = [Limb::Left, Limb::Right];

    pub(crate) fn index(self) -> usize {
        match self {
            Limb::Left => 0,
            Limb::Right => 1,
        }
    }
}

/// Actions a limb can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Fire,
    Channel,
    Gesture,
    /// Agent-level, uninterruptible (e.g. applying armor)
    CriticalAction,
}

impl ActionType {
    /// Exclusive actions own their limb for a nominal duration
    pub fn is_exclusive(&self) -> bool {
        matches!(self, ActionType::Gesture | ActionType::CriticalAction)
    }
}

/// The single discrete locomotion/animation category the agent is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    #[default]
    Idle,
    Walk,
    Sprint,
    Jump,
    Land,
    TakeOff,
    Slide,
    Dive,
    Flight,
    Falling,
}

impl PresentationState {
    /// States protected by a one-shot lock when set explicitly
    pub fn is_one_shot(&self) -> bool {
        matches!(self, PresentationState::Jump | PresentationState::Land)
    }

    /// Short-lived states that must not be held by the idle grace period
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            PresentationState::Jump | PresentationState::Land | PresentationState::TakeOff
        )
    }

    /// States allowed to override a critical action
    pub fn is_high_priority(&self) -> bool {
        matches!(
            self,
            PresentationState::Jump | PresentationState::Land | PresentationState::Dive
        )
    }
}

/// Sprint heading relative to the agent, attached only while sprinting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintDirection {
    Forward,
    Backward,
    ForwardLeft,
    ForwardRight,
    BackwardLeft,
    BackwardRight,
    StrafeLeft,
    StrafeRight,
}

/// How a committed state was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StateSource {
    /// Issued through `set_state`
    Explicit,
    /// Chosen by the per-tick resolver
    #[default]
    Auto,
}

macro_rules! display_via_debug {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        })*
    };
}

display_via_debug!(Limb, ActionType, PresentationState, SprintDirection, StateSource);

impl FromStr for Limb {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Limb::Left),
            "right" | "r" => Ok(Limb::Right),
            other => Err(CoordinatorError::InvalidCommand(format!("unknown limb '{}'", other))),
        }
    }
}

impl FromStr for ActionType {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fire" => Ok(ActionType::Fire),
            "channel" => Ok(ActionType::Channel),
            "gesture" => Ok(ActionType::Gesture),
            "critical" | "critical_action" => Ok(ActionType::CriticalAction),
            other => Err(CoordinatorError::InvalidCommand(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

impl FromStr for PresentationState {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PresentationState::*;
        match s.to_ascii_lowercase().as_str() {
            "idle" => Ok(Idle),
            "walk" => Ok(Walk),
            "sprint" => Ok(Sprint),
            "jump" => Ok(Jump),
            "land" => Ok(Land),
            "takeoff" | "take_off" => Ok(TakeOff),
            "slide" => Ok(Slide),
            "dive" => Ok(Dive),
            "flight" => Ok(Flight),
            "falling" => Ok(Falling),
            other => Err(CoordinatorError::InvalidCommand(format!(
                "unknown state '{}'",
                other
            ))),
        }
    }
}
