//! Scenario files: scripted sensor streams and requests
//!
//! ```toml
//! [config]
//! idle_delay_secs = 1.0
//!
//! [[step]]
//! repeat = 10
//! commands = ["set jump"]
//! [step.sensors]
//! grounded = false
//! ```
//!
//! Commands of a step are issued before its first tick. Replaying the same
//! scenario always produces the same trace.

use crate::coordinator::{Coordinator, Snapshot};
use crate::core::config::CoordinatorConfig;
use crate::core::error::{CoordinatorError, Result};
use crate::core::types::{AgentId, Tick};
use crate::resolver::LocomotionSensors;
use crate::script::command::{Command, CommandOutcome};
use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    /// Ticks to run with these sensors
    #[serde(default = "one")]
    pub repeat: u32,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub sensors: LocomotionSensors,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: Option<CoordinatorConfig>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// A request issued during replay and what came of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub tick: Tick,
    pub command: Command,
    pub outcome: CommandOutcome,
}

/// Everything a replay produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub frames: Vec<Snapshot>,
    pub requests: Vec<RequestRecord>,
}

/// Fixed id so traces of the same scenario compare equal
const REPLAY_AGENT: AgentId = AgentId(Uuid::nil());

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        if let Some(config) = &scenario.config {
            config.validate()?;
        }
        // Surface bad commands at load time rather than mid-replay
        for step in &scenario.steps {
            for line in &step.commands {
                line.parse::<Command>()?;
            }
        }
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load `data/scenarios/{name}.toml`
    pub fn load_named(name: &str) -> Result<Self> {
        let path = scenario_path(name);
        if !path.exists() {
            return Err(CoordinatorError::UnknownScenario(name.to_string()));
        }
        Self::load(path)
    }

    /// Build a random but reproducible scenario
    pub fn generate(seed: u64, ticks: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut steps = Vec::new();
        let mut remaining = ticks;

        while remaining > 0 {
            let repeat = rng.gen_range(1..=12).min(remaining);
            remaining -= repeat;

            let grounded = rng.gen_bool(0.75);
            let mut sensors = LocomotionSensors {
                grounded,
                falling: !grounded && rng.gen_bool(0.6),
                sliding: rng.gen_bool(0.05),
                diving: rng.gen_bool(0.03),
                movement_input: rng.gen_bool(0.5),
                ..Default::default()
            };
            if rng.gen_bool(0.25) {
                sensors.sprint_input = true;
                sensors.movement_input = true;
                sensors.sprint_vector = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
            }

            let commands = (0..rng.gen_range(0..=2))
                .map(|_| random_command(&mut rng).to_string())
                .collect();

            steps.push(Step {
                repeat,
                commands,
                sensors,
            });
        }

        Self {
            config: None,
            steps,
        }
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|s| s.repeat as u64).sum()
    }

    /// Replay on a fresh coordinator
    pub fn run(&self) -> Result<Trace> {
        let config = self.config.clone().unwrap_or_default();
        let mut coordinator = Coordinator::new(config)?.with_agent_id(REPLAY_AGENT);
        let mut trace = Trace {
            frames: Vec::with_capacity(self.total_ticks() as usize),
            requests: Vec::new(),
        };

        for step in &self.steps {
            for line in &step.commands {
                let command: Command = line.parse()?;
                let outcome = command.apply(&mut coordinator);
                trace.requests.push(RequestRecord {
                    tick: coordinator.now(),
                    command,
                    outcome,
                });
            }
            for _ in 0..step.repeat {
                trace.frames.push(coordinator.tick(step.sensors).clone());
            }
        }

        tracing::debug!(
            "Replayed {} ticks, {} requests",
            trace.frames.len(),
            trace.requests.len()
        );
        Ok(trace)
    }
}

fn random_command(rng: &mut ChaCha8Rng) -> Command {
    use crate::core::types::{ActionType, Limb, PresentationState};

    let limb = if rng.gen_bool(0.5) { Limb::Left } else { Limb::Right };
    let action = match rng.gen_range(0..4) {
        0 => ActionType::Fire,
        1 => ActionType::Channel,
        2 => ActionType::Gesture,
        _ => ActionType::CriticalAction,
    };

    match rng.gen_range(0..10) {
        0..=2 => Command::Start(limb, action),
        3..=4 => Command::Stop(limb, action),
        5 => Command::Done(limb, action),
        6 => Command::Gesture(rng.gen_range(0..3)),
        7 => Command::Critical,
        8 => Command::Set(PresentationState::Jump),
        _ => Command::Set(PresentationState::Land),
    }
}

/// Get path to a named scenario file
fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from("data/scenarios").join(format!("{}.toml", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PresentationState;

    const JUMP: &str = r#"
        [[step]]
        repeat = 2
        [step.sensors]
        grounded = true

        [[step]]
        commands = ["set jump"]
        repeat = 5

        [[step]]
        [step.sensors]
        grounded = true
    "#;

    #[test]
    fn test_parse_and_run() {
        let scenario = Scenario::from_toml_str(JUMP).unwrap();
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.total_ticks(), 8);

        let trace = scenario.run().unwrap();
        assert_eq!(trace.frames.len(), 8);
        assert_eq!(trace.requests[0].tick, 2);
        assert_eq!(trace.frames[2].state, PresentationState::Jump);
        assert_eq!(trace.frames[6].state, PresentationState::Jump);
        // Touching down cuts the jump short
        assert_ne!(trace.frames[7].state, PresentationState::Jump);
    }

    #[test]
    fn test_bad_command_rejected_at_load() {
        let err = Scenario::from_toml_str("[[step]]\ncommands = [\"jump now\"]\n").unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidCommand(_)));
    }

    #[test]
    fn test_config_overrides_validated() {
        let err = Scenario::from_toml_str("[config]\ntick_rate_hz = -1.0\n").unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidConfig(_)));
    }

    #[test]
    fn test_generated_scenarios_are_reproducible() {
        let a = Scenario::generate(7, 200);
        let b = Scenario::generate(7, 200);
        assert_eq!(a.total_ticks(), 200);
        assert_eq!(a.run().unwrap(), b.run().unwrap());
    }

    #[test]
    fn test_unknown_named_scenario() {
        assert!(matches!(
            Scenario::load_named("does_not_exist"),
            Err(CoordinatorError::UnknownScenario(_))
        ));
    }
}
