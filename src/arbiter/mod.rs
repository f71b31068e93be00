//! Limb action arbitration: accepts or denies start requests, owns the
//! per-limb action flags and the timed unlocks of exclusive actions.

pub mod arbitrator;
pub mod flags;

pub use arbitrator::{ActionArbitrator, ActionSignal, ArbiterTimings, DenyReason, TimedUnlock};
pub use flags::{AgentLimbFlags, LimbActionFlags};
