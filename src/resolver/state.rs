//! State resolver - the per-tick priority pass
//!
//! Priority order, first match wins:
//!
//! ```text
//! 1. One-shot lock held        -> hold (early exits: landing, airborne expiry)
//! 2. Override grace running    -> hold
//! 3. diving                    -> Dive
//! 4. sliding  && grounded      -> Slide
//! 5. sprint   && grounded      -> Sprint (+ direction)
//! 6. movement && grounded      -> Walk
//! 7. falling  && !grounded     -> Falling
//! 8. recent activity           -> hold, else Idle
//! ```
//!
//! A detected state is committed only if it differs from the current one,
//! the anti-spam interval has passed, and, during a critical action, it is
//! one of Jump, Land or Dive.

use crate::core::config::TickDurations;
use crate::core::types::{PresentationState, SprintDirection, StateSource, Tick};
use crate::locks::{Expiry, OneShotLock};
use crate::resolver::sensors::LocomotionSensors;
use crate::resolver::sprint::{sprint_direction, SprintThresholds};
use crate::timing::ActivityTracker;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Resolver durations in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverTimings {
    pub jump_lock: Tick,
    pub land_lock: Tick,
    pub manual_override_grace: Tick,
    pub min_transition_interval: Tick,
    pub idle_delay: Tick,
}

impl From<&TickDurations> for ResolverTimings {
    fn from(ticks: &TickDurations) -> Self {
        Self {
            jump_lock: ticks.jump_lock,
            land_lock: ticks.land_lock,
            manual_override_grace: ticks.manual_override_grace,
            min_transition_interval: ticks.min_transition_interval,
            idle_delay: ticks.idle_delay,
        }
    }
}

impl ResolverTimings {
    fn one_shot_duration(&self, state: PresentationState) -> Tick {
        match state {
            PresentationState::Land => self.land_lock,
            _ => self.jump_lock,
        }
    }
}

/// A committed state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub tick: Tick,
    pub from: PresentationState,
    pub to: PresentationState,
    pub source: StateSource,
    pub sprint_direction: Option<SprintDirection>,
}

/// Which rule of the priority pass decided this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// A one-shot lock is still running
    OneShotHeld(PresentationState),
    /// An explicit `set_state` is still inside its grace window
    OverrideHeld,
    /// A sensor rule matched
    Detected(PresentationState),
    /// Nothing matched but the agent was active recently
    GraceHeld,
    /// Nothing matched and the agent has been quiet long enough
    Idle,
}

/// Why a candidate state was not committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    CriticalActionActive,
    TooSoon,
}

/// Outcome of one resolve pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub decision: Decision,
    pub transition: Option<Transition>,
    pub rejected: Option<(PresentationState, RejectReason)>,
}

impl Resolution {
    fn hold(decision: Decision) -> Self {
        Self {
            decision,
            transition: None,
            rejected: None,
        }
    }
}

/// Owns the current presentation state and everything needed to decide
/// the next one
#[derive(Debug, Clone)]
pub struct StateResolver {
    timings: ResolverTimings,
    thresholds: SprintThresholds,
    state: PresentationState,
    source: StateSource,
    sprint_direction: Option<SprintDirection>,
    last_transition_at: Option<Tick>,
    override_grace: Option<Expiry>,
    prev_grounded: bool,
    last_sprint_vector: Vec2,
}

impl StateResolver {
    pub fn new(timings: ResolverTimings, thresholds: SprintThresholds) -> Self {
        Self {
            timings,
            thresholds,
            state: PresentationState::Idle,
            source: StateSource::Auto,
            sprint_direction: None,
            last_transition_at: None,
            override_grace: None,
            prev_grounded: true,
            last_sprint_vector: Vec2::ZERO,
        }
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn source(&self) -> StateSource {
        self.source
    }

    pub fn sprint_direction(&self) -> Option<SprintDirection> {
        self.sprint_direction
    }

    /// Commit `state` unconditionally, start the override grace window and
    /// install or drop the one-shot lock to match.
    pub fn set_state(
        &mut self,
        state: PresentationState,
        now: Tick,
        one_shot: &mut OneShotLock,
        activity: &mut ActivityTracker,
    ) -> Transition {
        if state.is_one_shot() {
            one_shot.install(state, now, self.timings.one_shot_duration(state));
            if let Some(active) = one_shot.current() {
                tracing::debug!(
                    "One-shot {:?} locked until tick {}",
                    state,
                    active.window.expires_at
                );
            }
        } else if let Some(dropped) = one_shot.clear() {
            tracing::debug!("Explicit {:?} cut one-shot {:?} short", state, dropped.state);
        }

        self.override_grace = (self.timings.manual_override_grace > 0)
            .then(|| Expiry::starting(now, self.timings.manual_override_grace));

        self.commit(state, StateSource::Explicit, now, activity)
    }

    /// Run the priority pass for tick `now`
    pub fn resolve(
        &mut self,
        now: Tick,
        sensors: &LocomotionSensors,
        critical_action_active: bool,
        one_shot: &mut OneShotLock,
        activity: &mut ActivityTracker,
    ) -> Resolution {
        let just_landed = sensors.grounded && !self.prev_grounded;
        self.prev_grounded = sensors.grounded;
        self.last_sprint_vector = sensors.sprint_vector;

        let mut released = false;
        let mut landed_from_jump = false;
        let mut airborne_after_jump = false;

        if let Some(active) = one_shot.current() {
            let expired = active.window.is_expired(now);
            let is_jump = active.state == PresentationState::Jump;

            if is_jump && just_landed {
                tracing::debug!("Landing interrupted jump at tick {}", now);
                one_shot.clear();
                self.override_grace = None;
                released = true;
                landed_from_jump = true;
            } else if is_jump && expired && !sensors.grounded {
                tracing::debug!("Jump expired airborne at tick {}", now);
                one_shot.clear();
                self.override_grace = None;
                released = true;
                airborne_after_jump = true;
            } else if !expired {
                activity.touch(now);
                return Resolution::hold(Decision::OneShotHeld(active.state));
            } else {
                one_shot.clear();
                released = true;
            }
        }

        if let Some(grace) = self.override_grace {
            if !grace.is_expired(now) {
                if self.state != PresentationState::Idle {
                    activity.touch(now);
                }
                return Resolution::hold(Decision::OverrideHeld);
            }
            self.override_grace = None;
        }

        let decision = match self.detect(sensors, airborne_after_jump) {
            Some(state) => Decision::Detected(state),
            // Transitional states have nothing to hold once their lock is gone
            None if self.state.is_transitional() => Decision::Idle,
            None if !activity.is_quiet(now, self.timings.idle_delay) => Decision::GraceHeld,
            None => Decision::Idle,
        };

        let mut candidate = match decision {
            Decision::Detected(state) => {
                activity.touch(now);
                state
            }
            Decision::Idle => PresentationState::Idle,
            _ => return Resolution::hold(decision),
        };

        // Touching down always leaves Jump; mid critical action only Land may follow
        if landed_from_jump && critical_action_active && !candidate.is_high_priority() {
            candidate = PresentationState::Land;
        }

        if candidate == self.state {
            if candidate == PresentationState::Sprint {
                self.sprint_direction = Some(sprint_direction(sensors.sprint_vector, &self.thresholds));
            }
            return Resolution::hold(decision);
        }

        if critical_action_active && !candidate.is_high_priority() {
            return Resolution {
                decision,
                transition: None,
                rejected: Some((candidate, RejectReason::CriticalActionActive)),
            };
        }

        let too_soon = self
            .last_transition_at
            .is_some_and(|at| now.saturating_sub(at) < self.timings.min_transition_interval);
        if too_soon && !released {
            return Resolution {
                decision,
                transition: None,
                rejected: Some((candidate, RejectReason::TooSoon)),
            };
        }

        Resolution {
            decision,
            transition: Some(self.commit(candidate, StateSource::Auto, now, activity)),
            rejected: None,
        }
    }

    /// Rules 3-7. `None` means nothing positive matched.
    fn detect(
        &self,
        sensors: &LocomotionSensors,
        airborne_after_jump: bool,
    ) -> Option<PresentationState> {
        let grounded = sensors.grounded;

        if sensors.diving {
            Some(PresentationState::Dive)
        } else if sensors.sliding && grounded {
            Some(PresentationState::Slide)
        } else if sensors.sprint_input && grounded {
            Some(PresentationState::Sprint)
        } else if sensors.movement_input && grounded {
            Some(PresentationState::Walk)
        } else if (sensors.falling || airborne_after_jump) && !grounded {
            Some(PresentationState::Falling)
        } else {
            None
        }
    }

    fn commit(
        &mut self,
        state: PresentationState,
        source: StateSource,
        now: Tick,
        activity: &mut ActivityTracker,
    ) -> Transition {
        let from = self.state;
        self.state = state;
        self.source = source;
        self.last_transition_at = Some(now);
        self.sprint_direction = (state == PresentationState::Sprint)
            .then(|| sprint_direction(self.last_sprint_vector, &self.thresholds));

        if state != PresentationState::Idle {
            activity.touch(now);
        }

        tracing::debug!("{:?} -> {:?} ({:?}) at tick {}", from, state, source, now);

        Transition {
            tick: now,
            from,
            to: state,
            source,
            sprint_direction: self.sprint_direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CoordinatorConfig;

    struct Rig {
        resolver: StateResolver,
        one_shot: OneShotLock,
        activity: ActivityTracker,
        now: Tick,
    }

    impl Rig {
        fn new() -> Self {
            let config = CoordinatorConfig::default();
            let timings = ResolverTimings::from(&config.tick_durations());
            Self {
                resolver: StateResolver::new(timings, SprintThresholds::from(&config)),
                one_shot: OneShotLock::new(),
                activity: ActivityTracker::new(),
                now: 0,
            }
        }

        fn step(&mut self, sensors: LocomotionSensors) -> Resolution {
            self.step_with(sensors, false)
        }

        fn step_with(&mut self, sensors: LocomotionSensors, critical: bool) -> Resolution {
            self.now += 1;
            self.resolver.resolve(
                self.now,
                &sensors,
                critical,
                &mut self.one_shot,
                &mut self.activity,
            )
        }

        fn set(&mut self, state: PresentationState) -> Transition {
            self.resolver
                .set_state(state, self.now, &mut self.one_shot, &mut self.activity)
        }
    }

    #[test]
    fn test_walk_detected_when_grounded() {
        let mut rig = Rig::new();
        let res = rig.step(LocomotionSensors::grounded().with_movement());
        assert_eq!(res.decision, Decision::Detected(PresentationState::Walk));
        assert_eq!(rig.resolver.state(), PresentationState::Walk);
        assert_eq!(res.transition.unwrap().source, StateSource::Auto);
    }

    #[test]
    fn test_airborne_ignores_movement_keys() {
        let mut rig = Rig::new();
        let mut sensors = LocomotionSensors::falling().with_movement();
        sensors.sprint_input = true;
        rig.step(sensors);
        assert_eq!(rig.resolver.state(), PresentationState::Falling);
    }

    #[test]
    fn test_dive_wins_even_airborne() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::falling().with_dive());
        assert_eq!(rig.resolver.state(), PresentationState::Dive);
    }

    #[test]
    fn test_grounded_beats_falling_contradiction() {
        let mut rig = Rig::new();
        let mut sensors = LocomotionSensors::grounded();
        sensors.falling = true;
        rig.step(sensors);
        assert_ne!(rig.resolver.state(), PresentationState::Falling);
    }

    #[test]
    fn test_slide_requires_ground() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::airborne().with_slide());
        assert_eq!(rig.resolver.state(), PresentationState::Idle);

        rig.step(LocomotionSensors::grounded().with_slide());
        assert_eq!(rig.resolver.state(), PresentationState::Slide);
    }

    #[test]
    fn test_sprint_direction_attached() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::grounded().with_sprint(-1.0, 0.2));
        assert_eq!(rig.resolver.state(), PresentationState::Sprint);
        assert_eq!(rig.resolver.sprint_direction(), Some(SprintDirection::ForwardLeft));

        // Direction follows the stick without a new transition
        let res = rig.step(LocomotionSensors::grounded().with_sprint(0.0, 1.0));
        assert!(res.transition.is_none());
        assert_eq!(rig.resolver.sprint_direction(), Some(SprintDirection::Forward));
    }

    #[test]
    fn test_anti_spam_interval() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::grounded().with_movement());
        let res = rig.step(LocomotionSensors::grounded().with_slide());
        assert_eq!(
            res.rejected,
            Some((PresentationState::Slide, RejectReason::TooSoon))
        );
        assert_eq!(rig.resolver.state(), PresentationState::Walk);

        rig.step(LocomotionSensors::grounded().with_slide());
        rig.step(LocomotionSensors::grounded().with_slide());
        assert_eq!(rig.resolver.state(), PresentationState::Slide);
    }

    #[test]
    fn test_jump_held_while_airborne() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        for _ in 0..35 {
            let res = rig.step(LocomotionSensors::airborne().with_movement());
            assert_eq!(rig.resolver.state(), PresentationState::Jump);
            assert!(res.transition.is_none());
        }
    }

    #[test]
    fn test_landing_interrupts_jump_immediately() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        rig.step(LocomotionSensors::airborne());
        let res = rig.step(LocomotionSensors::grounded());

        assert_ne!(rig.resolver.state(), PresentationState::Jump);
        assert!(rig.one_shot.current().is_none());
        assert!(res.transition.is_some());
    }

    #[test]
    fn test_jump_from_ground_is_not_self_interrupted() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::grounded());
        rig.set(PresentationState::Jump);
        rig.step(LocomotionSensors::grounded());
        assert_eq!(rig.resolver.state(), PresentationState::Jump);
    }

    #[test]
    fn test_jump_expiry_airborne_reports_falling() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        for _ in 0..36 {
            rig.step(LocomotionSensors::airborne());
        }
        assert_eq!(rig.resolver.state(), PresentationState::Falling);
    }

    #[test]
    fn test_land_lock_holds_over_movement() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Land);
        for _ in 0..29 {
            rig.step(LocomotionSensors::grounded().with_movement());
            assert_eq!(rig.resolver.state(), PresentationState::Land);
        }
        rig.step(LocomotionSensors::grounded().with_movement());
        assert_eq!(rig.resolver.state(), PresentationState::Walk);
    }

    #[test]
    fn test_override_grace_holds_explicit_state() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Flight);
        let res = rig.step(LocomotionSensors::grounded().with_movement());
        assert_eq!(res.decision, Decision::OverrideHeld);
        assert_eq!(rig.resolver.state(), PresentationState::Flight);
        assert_eq!(rig.resolver.source(), StateSource::Explicit);
    }

    #[test]
    fn test_idle_grace_then_idle() {
        let mut rig = Rig::new();
        rig.step(LocomotionSensors::grounded().with_movement());
        let walked_at = rig.now;

        loop {
            let res = rig.step(LocomotionSensors::grounded());
            if rig.resolver.state() == PresentationState::Idle {
                assert_eq!(res.decision, Decision::Idle);
                break;
            }
            assert_eq!(res.decision, Decision::GraceHeld);
        }
        assert_eq!(rig.now - walked_at, 180);
    }

    #[test]
    fn test_critical_action_only_allows_high_priority() {
        let mut rig = Rig::new();
        let res = rig.step_with(LocomotionSensors::grounded().with_movement(), true);
        assert_eq!(
            res.rejected,
            Some((PresentationState::Walk, RejectReason::CriticalActionActive))
        );
        assert_eq!(rig.resolver.state(), PresentationState::Idle);

        rig.step_with(LocomotionSensors::grounded().with_dive(), true);
        assert_eq!(rig.resolver.state(), PresentationState::Dive);
    }

    #[test]
    fn test_landing_during_critical_action_commits_land() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        rig.step_with(LocomotionSensors::airborne(), true);

        let res = rig.step_with(LocomotionSensors::grounded().with_movement(), true);
        assert_eq!(rig.resolver.state(), PresentationState::Land);
        assert_eq!(res.transition.unwrap().from, PresentationState::Jump);
        assert!(rig.one_shot.current().is_none());

        // Walk stays filtered while the critical action runs
        let res = rig.step_with(LocomotionSensors::grounded().with_movement(), true);
        assert_eq!(
            res.rejected,
            Some((PresentationState::Walk, RejectReason::CriticalActionActive))
        );
        assert_eq!(rig.resolver.state(), PresentationState::Land);
    }

    #[test]
    fn test_jump_expiry_during_critical_action_stays_filtered() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        for _ in 0..36 {
            rig.step_with(LocomotionSensors::falling(), true);
        }
        // Falling is not allowed through, and there is no landing to force Land
        assert_eq!(rig.resolver.state(), PresentationState::Jump);
        assert!(rig.one_shot.current().is_none());
    }

    #[test]
    fn test_explicit_non_one_shot_drops_lock() {
        let mut rig = Rig::new();
        rig.set(PresentationState::Jump);
        rig.step(LocomotionSensors::airborne());
        rig.set(PresentationState::Flight);
        assert!(rig.one_shot.current().is_none());
        assert_eq!(rig.resolver.state(), PresentationState::Flight);
    }
}
