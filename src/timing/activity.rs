//! Activity tracker - when did the agent last do anything?

use crate::core::types::Tick;
use serde::{Deserialize, Serialize};

/// Tick of the most recent non-idle behavior
///
/// The stamp never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTracker {
    last_activity: Tick,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, now: Tick) {
        self.last_activity = self.last_activity.max(now);
    }

    pub fn last_activity(&self) -> Tick {
        self.last_activity
    }

    pub fn ticks_since(&self, now: Tick) -> Tick {
        now.saturating_sub(self.last_activity)
    }

    /// Has the agent been quiet for at least `delay` ticks?
    pub fn is_quiet(&self, now: Tick, delay: Tick) -> bool {
        self.ticks_since(now) >= delay
    }
}
