//! Coordinator façade
//!
//! Sole owner of the presentation state and limb flags. Each `tick` runs,
//! in this order:
//!
//! 1. cooldown sweep
//! 2. queued completions and timed-unlock expiries
//! 3. state resolution
//! 4. snapshot publication
//!
//! Completions land before resolution so an action finishing this tick can
//! unblock detection in the same tick.

use crate::arbiter::{ActionArbitrator, AgentLimbFlags, ArbiterTimings};
use crate::coordinator::consumer::AnimationConsumer;
use crate::coordinator::history::TransitionHistory;
use crate::coordinator::snapshot::{LimbSnapshot, Snapshot};
use crate::core::config::CoordinatorConfig;
use crate::core::error::Result;
use crate::core::types::{
    ActionType, AgentId, Limb, PresentationState, SprintDirection, StateSource, Tick,
};
use crate::locks::{LimbLockTable, OneShotLock};
use crate::resolver::{
    Decision, LocomotionSensors, ResolverTimings, SprintThresholds, StateResolver, Transition,
};
use crate::timing::{ActivityTracker, TickClock};

pub struct Coordinator {
    agent: AgentId,
    config: CoordinatorConfig,
    clock: TickClock,
    activity: ActivityTracker,
    one_shot: OneShotLock,
    resolver: StateResolver,
    arbiter: ActionArbitrator,
    history: TransitionHistory,
    consumers: Vec<Box<dyn AnimationConsumer>>,
    snapshot: Snapshot,
}

impl Coordinator {
    /// Build a coordinator for a fresh agent. The config is validated.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        Self::with_consumers(config, Vec::new())
    }

    /// Build a coordinator with its consumers injected up front
    pub fn with_consumers(
        config: CoordinatorConfig,
        consumers: Vec<Box<dyn AnimationConsumer>>,
    ) -> Result<Self> {
        config.validate()?;

        let ticks = config.tick_durations();
        let agent = AgentId::new();
        tracing::info!(
            agent = %agent.0,
            "Coordinator ready at {}Hz (jump lock {} ticks, idle delay {} ticks)",
            config.tick_rate_hz,
            ticks.jump_lock,
            ticks.idle_delay
        );

        Ok(Self {
            agent,
            resolver: StateResolver::new(
                ResolverTimings::from(&ticks),
                SprintThresholds::from(&config),
            ),
            arbiter: ActionArbitrator::new(ArbiterTimings::from(&ticks)),
            history: TransitionHistory::new(config.history_capacity),
            clock: TickClock::new(),
            activity: ActivityTracker::new(),
            one_shot: OneShotLock::new(),
            consumers,
            snapshot: Snapshot::initial(agent),
            config,
        })
    }

    /// Replace the agent id (for reproducible traces)
    pub fn with_agent_id(mut self, agent: AgentId) -> Self {
        self.agent = agent;
        self.snapshot.agent = agent;
        self
    }

    pub fn subscribe(&mut self, consumer: Box<dyn AnimationConsumer>) {
        self.consumers.push(consumer);
    }

    /// Advance one frame with this tick's locomotion sensors
    pub fn tick(&mut self, sensors: LocomotionSensors) -> &Snapshot {
        let now = self.clock.advance();

        let swept = self.arbiter.sweep_cooldowns(now);
        if swept > 0 {
            tracing::trace!("Swept {} cooldown entries at tick {}", swept, now);
        }

        self.arbiter.settle(now);
        self.publish_signals();

        let resolution = self.resolver.resolve(
            now,
            &sensors,
            self.arbiter.is_critical_active(),
            &mut self.one_shot,
            &mut self.activity,
        );
        tracing::trace!("tick {}: {:?}", now, resolution.decision);
        if let Some((candidate, reason)) = resolution.rejected {
            tracing::trace!("tick {}: {:?} rejected ({:?})", now, candidate, reason);
        }
        if let Some(transition) = resolution.transition {
            self.history.push(transition);
        }

        self.snapshot = self.build_snapshot(Some(resolution.decision));
        for consumer in &mut self.consumers {
            consumer.on_snapshot(&self.snapshot);
        }
        &self.snapshot
    }

    /// Ask `limb` to start `action`. `false` means "denied, try later".
    pub fn request_action_start(&mut self, limb: Limb, action: ActionType) -> bool {
        let now = self.clock.now();
        let accepted = self
            .arbiter
            .try_start(limb, action, now, &mut self.activity)
            .is_ok();
        self.publish_signals();
        accepted
    }

    /// Stop `action` on `limb`. Never blocked.
    pub fn request_action_stop(&mut self, limb: Limb, action: ActionType) {
        let now = self.clock.now();
        self.arbiter.stop(limb, action, now);
        self.publish_signals();
    }

    /// Start gesture `index` on the configured gesture limb
    pub fn request_gesture(&mut self, index: usize) -> bool {
        let now = self.clock.now();
        let accepted = self
            .arbiter
            .try_start_gesture(self.config.gesture_limb, index, now, &mut self.activity)
            .is_ok();
        self.publish_signals();
        accepted
    }

    /// Start the critical action on the configured limb
    pub fn request_critical_action(&mut self) -> bool {
        self.request_action_start(self.config.critical_action_limb, ActionType::CriticalAction)
    }

    /// The animation layer finished playing `action` on `limb`.
    /// Applied at the start of the next tick.
    pub fn notify_completed(&mut self, limb: Limb, action: ActionType) {
        self.arbiter.notify_completed(limb, action);
    }

    /// Explicitly enter `state`, bypassing detection for this tick
    pub fn set_state(&mut self, state: PresentationState) -> Transition {
        let now = self.clock.now();
        let transition =
            self.resolver
                .set_state(state, now, &mut self.one_shot, &mut self.activity);
        self.history.push(transition);
        transition
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn state(&self) -> PresentationState {
        self.resolver.state()
    }

    pub fn state_source(&self) -> StateSource {
        self.resolver.source()
    }

    pub fn sprint_direction(&self) -> Option<SprintDirection> {
        self.resolver.sprint_direction()
    }

    pub fn limb_flags(&self) -> &AgentLimbFlags {
        self.arbiter.flags()
    }

    pub fn limb_locks(&self) -> &LimbLockTable {
        self.arbiter.locks()
    }

    pub fn is_shooting(&self) -> bool {
        self.arbiter.flags().is_shooting()
    }

    pub fn is_channeling(&self) -> bool {
        self.arbiter.flags().is_channeling()
    }

    pub fn is_in_critical_action(&self) -> bool {
        self.arbiter.is_critical_active()
    }

    pub fn is_gesturing(&self) -> bool {
        self.arbiter.is_gesturing()
    }

    pub fn one_shot(&self) -> &OneShotLock {
        &self.one_shot
    }

    pub fn last_activity(&self) -> Tick {
        self.activity.last_activity()
    }

    /// Snapshot published at the end of the last tick
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Live view, including requests issued since the last tick
    pub fn current_snapshot(&self) -> Snapshot {
        self.build_snapshot(None)
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Human-readable dump of the live state for diagnostics tooling
    pub fn debug_dump(&self) -> String {
        let mut dump = self.current_snapshot().to_string();
        dump.push_str(&format!(
            "\n  last activity: tick {} | pending completions: {} | cooldowns: {}",
            self.activity.last_activity(),
            self.arbiter.pending_completions(),
            self.arbiter.cooldowns().len()
        ));
        if let Some(critical) = self.arbiter.critical_action() {
            dump.push_str(&format!(
                "\n  critical action on {} ends at tick {}",
                critical.limb, critical.window.expires_at
            ));
        }
        if let Some(gesture) = self.arbiter.gesture() {
            dump.push_str(&format!(
                "\n  gesture {:?} on {} ends at tick {}",
                gesture.index, gesture.limb, gesture.window.expires_at
            ));
        }
        for transition in self.history.iter() {
            dump.push_str(&format!(
                "\n    [{}] {} -> {} ({})",
                transition.tick, transition.from, transition.to, transition.source
            ));
        }
        dump
    }

    fn publish_signals(&mut self) {
        for signal in self.arbiter.drain_signals() {
            for consumer in &mut self.consumers {
                consumer.on_signal(&signal);
            }
        }
    }

    fn build_snapshot(&self, decision: Option<Decision>) -> Snapshot {
        let flags = self.arbiter.flags();
        let locks = self.arbiter.locks();
        let limb = |limb: Limb| LimbSnapshot {
            flags: flags.get(limb),
            lock: locks.reason(limb),
        };

        Snapshot {
            tick: self.clock.now(),
            agent: self.agent,
            state: self.resolver.state(),
            source: self.resolver.source(),
            sprint_direction: self.resolver.sprint_direction(),
            left: limb(Limb::Left),
            right: limb(Limb::Right),
            critical_action_active: self.arbiter.is_critical_active(),
            gesturing: self.arbiter.is_gesturing(),
            one_shot: self.one_shot.current(),
            decision,
        }
    }
}
