//! Coordinator configuration with documented constants
//!
//! Every timing constant is expressed in seconds here and converted once,
//! at construction, into whole ticks at the configured frame rate.

use crate::core::error::{CoordinatorError, Result};
use crate::core::types::{Limb, Tick};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// Tick conversion constants
/// Slack subtracted before rounding a duration up to whole ticks, so f32
/// products like 0.6 * 60 = 36.000002 land on 36 and not 37
pub const TICK_ROUNDING_EPSILON: f32 = 1e-3;

/// Tunable parameters for the coordinator
///
/// These values have been tuned against a 60Hz frame loop. Changing them
/// affects how snappy or forgiving the agent's presentation feels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    // === CLOCK ===
    /// Frames per second of the tick loop
    pub tick_rate_hz: f32,

    // === ONE-SHOT TRANSITIONS ===
    /// How long an explicit Jump is protected from auto-detection
    pub jump_lock_secs: f32,

    /// How long an explicit Land is protected from auto-detection
    pub land_lock_secs: f32,

    /// Window after any explicit `set_state` during which the resolver
    /// holds the commanded state instead of re-deciding over it
    pub manual_override_grace_secs: f32,

    // === RESOLVER ===
    /// Minimum gap between two auto-detected transitions
    ///
    /// Absorbs single-frame sensor chatter. At 60Hz, 0.05s is 3 ticks.
    pub min_transition_interval_secs: f32,

    /// Quiet time before falling back to Idle
    ///
    /// Short input gaps shorter than this keep the current pose.
    pub idle_delay_secs: f32,

    /// Axis magnitude at which the sprint vector counts as a cardinal heading
    pub sprint_cardinal_threshold: f32,

    /// Lateral magnitude at which the sprint vector counts as a diagonal
    pub sprint_diagonal_threshold: f32,

    // === ARBITRATION ===
    /// Re-trigger guard armed on every accepted start
    ///
    /// Several input sources polling the same button must not start the
    /// same action twice.
    pub retrigger_guard_secs: f32,

    /// Nominal gesture length used when no per-index duration is set
    pub gesture_duration_secs: f32,

    /// Per-gesture-index durations (index into this list)
    pub gesture_durations_secs: Vec<f32>,

    /// Nominal critical action length (e.g. applying armor)
    pub critical_action_duration_secs: f32,

    /// Limb owned by a critical action
    pub critical_action_limb: Limb,

    /// Limb used by `request_gesture`
    pub gesture_limb: Limb,

    // === DIAGNOSTICS ===
    /// Number of transitions kept in the history ring
    pub history_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,

            jump_lock_secs: 0.6,
            land_lock_secs: 0.5,
            manual_override_grace_secs: 0.2,

            min_transition_interval_secs: 0.05,
            idle_delay_secs: 3.0,
            sprint_cardinal_threshold: 0.3,
            sprint_diagonal_threshold: 0.5,

            retrigger_guard_secs: 0.1,
            gesture_duration_secs: 2.0,
            gesture_durations_secs: Vec::new(),
            critical_action_duration_secs: 1.5,
            critical_action_limb: Limb::Right,
            gesture_limb: Limb::Left,

            history_capacity: 32,
        }
    }
}

impl CoordinatorConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document; missing keys keep defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: CoordinatorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate_hz > 0.0 && self.tick_rate_hz.is_finite()) {
            return Err(CoordinatorError::InvalidConfig(format!(
                "tick_rate_hz ({}) must be positive",
                self.tick_rate_hz
            )));
        }

        let durations = [
            ("jump_lock_secs", self.jump_lock_secs),
            ("land_lock_secs", self.land_lock_secs),
            ("manual_override_grace_secs", self.manual_override_grace_secs),
            ("min_transition_interval_secs", self.min_transition_interval_secs),
            ("idle_delay_secs", self.idle_delay_secs),
            ("retrigger_guard_secs", self.retrigger_guard_secs),
            ("gesture_duration_secs", self.gesture_duration_secs),
            ("critical_action_duration_secs", self.critical_action_duration_secs),
        ];
        for (name, secs) in durations {
            if !(secs >= 0.0 && secs.is_finite()) {
                return Err(CoordinatorError::InvalidConfig(format!(
                    "{} ({}) must be finite and not negative",
                    name, secs
                )));
            }
        }
        if self
            .gesture_durations_secs
            .iter()
            .any(|s| !(*s >= 0.0 && s.is_finite()))
        {
            return Err(CoordinatorError::InvalidConfig(
                "gesture_durations_secs must be finite and not negative".into(),
            ));
        }

        for (name, value) in [
            ("sprint_cardinal_threshold", self.sprint_cardinal_threshold),
            ("sprint_diagonal_threshold", self.sprint_diagonal_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(CoordinatorError::InvalidConfig(format!(
                    "{} ({}) must be in (0, 1]",
                    name, value
                )));
            }
        }
        if self.sprint_diagonal_threshold < self.sprint_cardinal_threshold {
            return Err(CoordinatorError::InvalidConfig(format!(
                "sprint_diagonal_threshold ({}) should be >= sprint_cardinal_threshold ({})",
                self.sprint_diagonal_threshold, self.sprint_cardinal_threshold
            )));
        }

        if self.history_capacity == 0 {
            return Err(CoordinatorError::InvalidConfig(
                "history_capacity must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Convert seconds to whole ticks, rounding up
    ///
    /// Any non-zero duration lasts at least one tick.
    pub fn secs_to_ticks(&self, secs: f32) -> Tick {
        if secs <= 0.0 {
            return 0;
        }
        let raw = secs * self.tick_rate_hz - TICK_ROUNDING_EPSILON;
        (raw.ceil() as Tick).max(1)
    }

    /// Resolve every duration into ticks
    pub fn tick_durations(&self) -> TickDurations {
        TickDurations {
            jump_lock: self.secs_to_ticks(self.jump_lock_secs),
            land_lock: self.secs_to_ticks(self.land_lock_secs),
            manual_override_grace: self.secs_to_ticks(self.manual_override_grace_secs),
            min_transition_interval: self.secs_to_ticks(self.min_transition_interval_secs),
            idle_delay: self.secs_to_ticks(self.idle_delay_secs),
            retrigger_guard: self.secs_to_ticks(self.retrigger_guard_secs),
            gesture: self.secs_to_ticks(self.gesture_duration_secs),
            gestures: self
                .gesture_durations_secs
                .iter()
                .map(|s| self.secs_to_ticks(*s))
                .collect(),
            critical_action: self.secs_to_ticks(self.critical_action_duration_secs),
        }
    }
}

/// Durations from [`CoordinatorConfig`] converted to ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickDurations {
    pub jump_lock: Tick,
    pub land_lock: Tick,
    pub manual_override_grace: Tick,
    pub min_transition_interval: Tick,
    pub idle_delay: Tick,
    pub retrigger_guard: Tick,
    pub gesture: Tick,
    pub gestures: Vec<Tick>,
    pub critical_action: Tick,
}
