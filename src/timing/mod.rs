//! Tick-counted timekeeping: the frame clock, start cooldowns and the
//! last-activity stamp used for idle decay.

pub mod activity;
pub mod clock;
pub mod cooldown;

pub use activity::ActivityTracker;
pub use clock::TickClock;
pub use cooldown::{CooldownKey, CooldownLedger};
