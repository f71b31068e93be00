//! Frame clock

use crate::core::types::Tick;
use serde::{Deserialize, Serialize};

/// Monotonic tick counter owned by the coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    now: Tick,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Advance by one frame and return the new tick
    pub fn advance(&mut self) -> Tick {
        self.now += 1;
        self.now
    }

    /// Ticks elapsed since `earlier` (zero if `earlier` is in the future)
    pub fn since(&self, earlier: Tick) -> Tick {
        self.now.saturating_sub(earlier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let mut clock = TickClock::new();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.since(0), 2);
        assert_eq!(clock.since(5), 0);
    }
}
