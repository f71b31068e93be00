//! Text commands and TOML scenarios used by the console and replay tools

pub mod command;
pub mod scenario;

pub use command::{Command, CommandOutcome};
pub use scenario::{RequestRecord, Scenario, Step, Trace};
