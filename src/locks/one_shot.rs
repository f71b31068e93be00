//! One-shot lock for transitional animations (Jump, Land)

use crate::core::types::{PresentationState, Tick};
use serde::{Deserialize, Serialize};

/// A `[started_at, expires_at)` window measured in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiry {
    pub started_at: Tick,
    pub expires_at: Tick,
}

impl Expiry {
    pub fn starting(now: Tick, duration: Tick) -> Self {
        Self {
            started_at: now,
            expires_at: now.saturating_add(duration),
        }
    }

    pub fn is_expired(&self, now: Tick) -> bool {
        now >= self.expires_at
    }

    pub fn remaining(&self, now: Tick) -> Tick {
        self.expires_at.saturating_sub(now)
    }
}

/// The transitional state currently protected, and until when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOneShot {
    pub state: PresentationState,
    pub window: Expiry,
}

/// Optional `(state, expiry)` pair consulted first by the resolver
///
/// Only Jump and Land can be installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotLock {
    active: Option<ActiveOneShot>,
}

impl OneShotLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect `state` for `duration` ticks. Returns false (and leaves any
    /// existing lock untouched) for states that are not one-shots.
    pub fn install(&mut self, state: PresentationState, now: Tick, duration: Tick) -> bool {
        if !state.is_one_shot() {
            return false;
        }
        self.active = Some(ActiveOneShot {
            state,
            window: Expiry::starting(now, duration),
        });
        true
    }

    pub fn current(&self) -> Option<ActiveOneShot> {
        self.active
    }

    pub fn state(&self) -> Option<PresentationState> {
        self.active.map(|a| a.state)
    }

    /// Is a lock installed and still running at `now`?
    pub fn is_held(&self, now: Tick) -> bool {
        self.active.is_some_and(|a| !a.window.is_expired(now))
    }

    /// Is a lock installed whose window has run out?
    pub fn is_expired(&self, now: Tick) -> bool {
        self.active.is_some_and(|a| a.window.is_expired(now))
    }

    pub fn clear(&mut self) -> Option<ActiveOneShot> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_jump() {
        let mut lock = OneShotLock::new();
        assert!(lock.install(PresentationState::Jump, 10, 36));
        assert_eq!(lock.state(), Some(PresentationState::Jump));
        assert!(lock.is_held(10));
        assert!(lock.is_held(45));
        assert!(!lock.is_held(46));
        assert!(lock.is_expired(46));
    }

    #[test]
    fn test_rejects_non_one_shot_states() {
        let mut lock = OneShotLock::new();
        lock.install(PresentationState::Land, 0, 30);

        assert!(!lock.install(PresentationState::Sprint, 1, 30));
        assert_eq!(lock.state(), Some(PresentationState::Land));
    }

    #[test]
    fn test_reinstall_replaces_window() {
        let mut lock = OneShotLock::new();
        lock.install(PresentationState::Jump, 0, 36);
        lock.install(PresentationState::Land, 20, 30);

        let active = lock.current().unwrap();
        assert_eq!(active.state, PresentationState::Land);
        assert_eq!(active.window.expires_at, 50);
    }

    #[test]
    fn test_clear() {
        let mut lock = OneShotLock::new();
        lock.install(PresentationState::Jump, 0, 36);
        assert!(lock.clear().is_some());
        assert!(!lock.is_held(1));
        assert!(!lock.is_expired(100));
    }

    #[test]
    fn test_huge_window_saturates() {
        let window = Expiry::starting(10, Tick::MAX);
        assert_eq!(window.expires_at, Tick::MAX);
        assert!(!window.is_expired(10));
        assert!(!window.is_expired(1_000_000));
    }

    #[test]
    fn test_expiry_remaining() {
        let window = Expiry::starting(5, 10);
        assert_eq!(window.remaining(5), 10);
        assert_eq!(window.remaining(14), 1);
        assert_eq!(window.remaining(20), 0);
    }
}
