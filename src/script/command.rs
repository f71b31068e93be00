//! One-line request commands shared by the console and scenario files
//!
//! ```text
//! start <limb> <action>    stop <limb> <action>    done <limb> <action>
//! gesture <index>          critical                set <state>
//! ```

use crate::coordinator::Coordinator;
use crate::core::error::{CoordinatorError, Result};
use crate::core::types::{ActionType, Limb, PresentationState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start(Limb, ActionType),
    Stop(Limb, ActionType),
    Done(Limb, ActionType),
    Gesture(usize),
    Critical,
    Set(PresentationState),
}

/// What happened when a command was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Accepted,
    Denied,
    /// Stops, completions and explicit transitions always apply
    Applied,
}

impl Command {
    pub fn apply(&self, coordinator: &mut Coordinator) -> CommandOutcome {
        let accepted = |ok: bool| {
            if ok {
                CommandOutcome::Accepted
            } else {
                CommandOutcome::Denied
            }
        };

        match *self {
            Command::Start(limb, action) => accepted(coordinator.request_action_start(limb, action)),
            Command::Gesture(index) => accepted(coordinator.request_gesture(index)),
            Command::Critical => accepted(coordinator.request_critical_action()),
            Command::Stop(limb, action) => {
                coordinator.request_action_stop(limb, action);
                CommandOutcome::Applied
            }
            Command::Done(limb, action) => {
                coordinator.notify_completed(limb, action);
                CommandOutcome::Applied
            }
            Command::Set(state) => {
                coordinator.set_state(state);
                CommandOutcome::Applied
            }
        }
    }
}

fn usage(line: &str) -> CoordinatorError {
    CoordinatorError::InvalidCommand(format!(
        "'{}' (expected start|stop|done <limb> <action>, gesture <n>, critical, set <state>)",
        line
    ))
}

impl FromStr for Command {
    type Err = CoordinatorError;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let verb = words.first().map(|w| w.to_ascii_lowercase());

        match (verb.as_deref(), &words[..]) {
            (Some("start"), [_, limb, action]) => Ok(Command::Start(limb.parse()?, action.parse()?)),
            (Some("stop"), [_, limb, action]) => Ok(Command::Stop(limb.parse()?, action.parse()?)),
            (Some("done"), [_, limb, action]) => Ok(Command::Done(limb.parse()?, action.parse()?)),
            (Some("gesture"), [_, index]) => index
                .parse()
                .map(Command::Gesture)
                .map_err(|_| usage(line)),
            (Some("critical"), [_]) => Ok(Command::Critical),
            (Some("set"), [_, state]) => Ok(Command::Set(state.parse()?)),
            _ => Err(usage(line)),
        }
    }
}

fn action_word(action: ActionType) -> &'static str {
    match action {
        ActionType::Fire => "fire",
        ActionType::Channel => "channel",
        ActionType::Gesture => "gesture",
        ActionType::CriticalAction => "critical",
    }
}

fn limb_word(limb: Limb) -> &'static str {
    match limb {
        Limb::Left => "left",
        Limb::Right => "right",
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::Start(limb, action) => {
                write!(f, "start {} {}", limb_word(limb), action_word(action))
            }
            Command::Stop(limb, action) => {
                write!(f, "stop {} {}", limb_word(limb), action_word(action))
            }
            Command::Done(limb, action) => {
                write!(f, "done {} {}", limb_word(limb), action_word(action))
            }
            Command::Gesture(index) => write!(f, "gesture {}", index),
            Command::Critical => write!(f, "critical"),
            Command::Set(state) => write!(f, "set {}", state.to_string().to_ascii_lowercase()),
        }
    }
}
