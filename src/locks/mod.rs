//! Timed and derived locks
//!
//! Nothing here ever blocks the tick: every lock is an expiry tick compared
//! against the current tick on each pass.

pub mod limb;
pub mod one_shot;

pub use limb::{LimbLockTable, LockReason};
pub use one_shot::{ActiveOneShot, Expiry, OneShotLock};
