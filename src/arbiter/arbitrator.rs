//! Action arbitrator
//!
//! Start requests pass three checks in order: the `(limb, action)`
//! cooldown is ready, the limb is not locked, and no conflicting exclusive
//! action is running. A denied start changes nothing. Stops are never
//! blocked.
//!
//! Gestures and critical actions lock their limb for a fixed window. The
//! window is set once on acceptance and never renewed, so a limb is never
//! held past its owning action's nominal duration.

use crate::core::config::TickDurations;
use crate::core::types::{ActionType, Limb, Tick};
use crate::arbiter::flags::AgentLimbFlags;
use crate::locks::{Expiry, LimbLockTable};
use crate::timing::{ActivityTracker, CooldownLedger};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Begin/end notifications for the animation consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSignal {
    Begin {
        limb: Limb,
        action: ActionType,
        tick: Tick,
    },
    End {
        limb: Limb,
        action: ActionType,
        tick: Tick,
    },
}

/// Why a start request was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenyReason {
    Cooldown,
    LimbLocked,
    CriticalActionInProgress,
    GestureInProgress,
}

/// Arbitration durations in ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbiterTimings {
    pub retrigger_guard: Tick,
    pub gesture: Tick,
    pub gestures: Vec<Tick>,
    pub critical_action: Tick,
}

impl From<&TickDurations> for ArbiterTimings {
    fn from(ticks: &TickDurations) -> Self {
        Self {
            retrigger_guard: ticks.retrigger_guard,
            gesture: ticks.gesture,
            gestures: ticks.gestures.clone(),
            critical_action: ticks.critical_action,
        }
    }
}

impl ArbiterTimings {
    fn gesture_duration(&self, index: Option<usize>) -> Tick {
        index
            .and_then(|i| self.gestures.get(i).copied())
            .unwrap_or(self.gesture)
    }
}

/// An exclusive action that owns a limb until its window closes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedUnlock {
    pub limb: Limb,
    pub window: Expiry,
    /// Gesture index, when started through `try_start_gesture`
    pub index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ActionArbitrator {
    timings: ArbiterTimings,
    cooldowns: CooldownLedger,
    flags: AgentLimbFlags,
    critical: Option<TimedUnlock>,
    gesture: Option<TimedUnlock>,
    locks: LimbLockTable,
    completions: VecDeque<(Limb, ActionType)>,
    outbox: Vec<ActionSignal>,
}

impl ActionArbitrator {
    pub fn new(timings: ArbiterTimings) -> Self {
        Self {
            timings,
            cooldowns: CooldownLedger::new(),
            flags: AgentLimbFlags::default(),
            critical: None,
            gesture: None,
            locks: LimbLockTable::new(),
            completions: VecDeque::new(),
            outbox: Vec::new(),
        }
    }

    /// Validate and apply a start request
    pub fn try_start(
        &mut self,
        limb: Limb,
        action: ActionType,
        now: Tick,
        activity: &mut ActivityTracker,
    ) -> Result<(), DenyReason> {
        self.start_inner(limb, action, None, now, activity)
    }

    /// Start gesture `index` on `limb`
    pub fn try_start_gesture(
        &mut self,
        limb: Limb,
        index: usize,
        now: Tick,
        activity: &mut ActivityTracker,
    ) -> Result<(), DenyReason> {
        self.start_inner(limb, ActionType::Gesture, Some(index), now, activity)
    }

    fn start_inner(
        &mut self,
        limb: Limb,
        action: ActionType,
        gesture_index: Option<usize>,
        now: Tick,
        activity: &mut ActivityTracker,
    ) -> Result<(), DenyReason> {
        if let Err(reason) = self.check_start(limb, action, now) {
            tracing::debug!("Denied {:?} on {:?} at tick {}: {:?}", action, limb, now, reason);
            return Err(reason);
        }

        match action {
            ActionType::Fire | ActionType::Channel => {
                self.flags.get_mut(limb).set(action, true);
            }
            ActionType::Gesture => {
                self.release_limb(limb, now);
                let duration = self.timings.gesture_duration(gesture_index);
                self.gesture = Some(TimedUnlock {
                    limb,
                    window: Expiry::starting(now, duration),
                    index: gesture_index,
                });
            }
            ActionType::CriticalAction => {
                self.release_limb(limb, now);
                self.critical = Some(TimedUnlock {
                    limb,
                    window: Expiry::starting(now, self.timings.critical_action),
                    index: None,
                });
            }
        }

        self.cooldowns
            .arm((limb, action), now, self.timings.retrigger_guard);
        activity.touch(now);
        self.relock();
        self.outbox.push(ActionSignal::Begin { limb, action, tick: now });

        tracing::debug!("Accepted {:?} on {:?} at tick {}", action, limb, now);
        Ok(())
    }

    fn check_start(&self, limb: Limb, action: ActionType, now: Tick) -> Result<(), DenyReason> {
        if !self.cooldowns.is_ready((limb, action), now) {
            return Err(DenyReason::Cooldown);
        }
        if self.locks.is_locked(limb) {
            return Err(DenyReason::LimbLocked);
        }
        match action {
            ActionType::CriticalAction if self.critical.is_some() => {
                Err(DenyReason::CriticalActionInProgress)
            }
            ActionType::CriticalAction if self.gesture.is_some() => {
                Err(DenyReason::GestureInProgress)
            }
            ActionType::Gesture if self.critical.is_some() => {
                Err(DenyReason::CriticalActionInProgress)
            }
            ActionType::Gesture if self.gesture.is_some() => Err(DenyReason::GestureInProgress),
            _ => Ok(()),
        }
    }

    /// Apply a stop request immediately. Always accepted; critical actions
    /// ignore it and run until their own timer ends.
    pub fn stop(&mut self, limb: Limb, action: ActionType, now: Tick) {
        match action {
            ActionType::Fire | ActionType::Channel => {
                self.flags.get_mut(limb).set(action, false);
            }
            ActionType::Gesture => {
                if self.gesture.is_some_and(|g| g.limb == limb) {
                    self.gesture = None;
                    self.relock();
                }
            }
            ActionType::CriticalAction => {
                tracing::debug!("Ignored stop for critical action on {:?}", limb);
                return;
            }
        }
        self.outbox.push(ActionSignal::End { limb, action, tick: now });
    }

    /// Queue a "finished playing" report; applied on the next `settle`
    pub fn notify_completed(&mut self, limb: Limb, action: ActionType) {
        self.completions.push_back((limb, action));
    }

    pub fn pending_completions(&self) -> usize {
        self.completions.len()
    }

    /// Drop expired cooldown entries
    pub fn sweep_cooldowns(&mut self, now: Tick) -> usize {
        self.cooldowns.sweep(now)
    }

    /// Apply queued completions, then expire timed unlocks. Returns how
    /// many flags or locks were released.
    pub fn settle(&mut self, now: Tick) -> usize {
        let mut released = 0;

        while let Some((limb, action)) = self.completions.pop_front() {
            let cleared = match action {
                ActionType::Fire | ActionType::Channel => self.flags.get_mut(limb).set(action, false),
                ActionType::Gesture => {
                    let owned = self.gesture.is_some_and(|g| g.limb == limb);
                    if owned {
                        self.gesture = None;
                    }
                    owned
                }
                ActionType::CriticalAction => {
                    tracing::debug!("Ignored completion for critical action on {:?}", limb);
                    false
                }
            };
            if cleared {
                released += 1;
            }
        }

        if let Some(gesture) = self.gesture.filter(|g| g.window.is_expired(now)) {
            self.gesture = None;
            self.outbox.push(ActionSignal::End {
                limb: gesture.limb,
                action: ActionType::Gesture,
                tick: now,
            });
            released += 1;
        }

        if let Some(critical) = self.critical.filter(|c| c.window.is_expired(now)) {
            self.critical = None;
            self.outbox.push(ActionSignal::End {
                limb: critical.limb,
                action: ActionType::CriticalAction,
                tick: now,
            });
            tracing::debug!("Critical action on {:?} finished at tick {}", critical.limb, now);
            released += 1;
        }

        if released > 0 {
            self.relock();
        }
        released
    }

    /// Take the signals emitted since the last drain
    pub fn drain_signals(&mut self) -> Vec<ActionSignal> {
        std::mem::take(&mut self.outbox)
    }

    pub fn flags(&self) -> &AgentLimbFlags {
        &self.flags
    }

    pub fn locks(&self) -> &LimbLockTable {
        &self.locks
    }

    pub fn cooldowns(&self) -> &CooldownLedger {
        &self.cooldowns
    }

    pub fn is_critical_active(&self) -> bool {
        self.critical.is_some()
    }

    pub fn is_gesturing(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn critical_action(&self) -> Option<TimedUnlock> {
        self.critical
    }

    pub fn gesture(&self) -> Option<TimedUnlock> {
        self.gesture
    }

    /// An exclusive action is taking over `limb`: end whatever it was doing
    fn release_limb(&mut self, limb: Limb, now: Tick) {
        for action in [ActionType::Fire, ActionType::Channel] {
            if self.flags.get_mut(limb).set(action, false) {
                self.outbox.push(ActionSignal::End { limb, action, tick: now });
            }
        }
    }

    fn relock(&mut self) {
        self.locks = LimbLockTable::derive(
            self.critical.map(|c| c.limb),
            self.gesture.map(|g| g.limb),
        );
    }
}
