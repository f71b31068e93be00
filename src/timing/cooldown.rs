//! Cooldown ledger - keyed expiry map gating action starts
//!
//! Cooldowns never block a stop. They only stop the same logical start
//! from being accepted twice within a short cluster of ticks.

use crate::core::types::{ActionType, Limb, Tick};
use ahash::AHashMap;

/// Ledger key: one entry per limb and action
pub type CooldownKey = (Limb, ActionType);

/// Map from action key to the tick at which it becomes ready again
#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    armed_until: AHashMap<CooldownKey, Tick>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can `key` be triggered at `now`?
    pub fn is_ready(&self, key: CooldownKey, now: Tick) -> bool {
        self.armed_until
            .get(&key)
            .map_or(true, |&until| now >= until)
    }

    /// Block `key` for `duration` ticks starting at `now`
    pub fn arm(&mut self, key: CooldownKey, now: Tick, duration: Tick) {
        let until = now.saturating_add(duration);
        let entry = self.armed_until.entry(key).or_insert(until);
        *entry = (*entry).max(until);
    }

    /// Ticks until `key` is ready (zero if ready)
    pub fn remaining(&self, key: CooldownKey, now: Tick) -> Tick {
        self.armed_until
            .get(&key)
            .map_or(0, |&until| until.saturating_sub(now))
    }

    /// Drop expired entries, returns how many were removed
    pub fn sweep(&mut self, now: Tick) -> usize {
        let before = self.armed_until.len();
        self.armed_until.retain(|_, until| now < *until);
        before - self.armed_until.len()
    }

    pub fn len(&self) -> usize {
        self.armed_until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed_until.is_empty()
    }
}
