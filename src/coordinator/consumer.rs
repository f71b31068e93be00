//! Observers of the coordinator's outbound stream

use crate::arbiter::ActionSignal;
use crate::coordinator::snapshot::Snapshot;
use crate::core::types::{PresentationState, Tick};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Receives begin/end signals as requests are accepted, and one snapshot
/// at the end of every tick
pub trait AnimationConsumer {
    fn on_signal(&mut self, _signal: &ActionSignal) {}

    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}
}

/// Everything a consumer can observe, as one message type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    Signal(ActionSignal),
    Snapshot(Snapshot),
}

/// In-memory log of everything observed
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub signals: Vec<ActionSignal>,
    pub snapshots: Vec<Snapshot>,
}

impl Recording {
    /// Presentation state per recorded tick
    pub fn states(&self) -> Vec<(Tick, PresentationState)> {
        self.snapshots.iter().map(|s| (s.tick, s.state)).collect()
    }
}

/// Records into a shared [`Recording`] the caller keeps a handle to
#[derive(Debug, Clone, Default)]
pub struct RecordingConsumer {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recording(&self) -> Rc<RefCell<Recording>> {
        Rc::clone(&self.recording)
    }
}

impl AnimationConsumer for RecordingConsumer {
    fn on_signal(&mut self, signal: &ActionSignal) {
        self.recording.borrow_mut().signals.push(*signal);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.recording.borrow_mut().snapshots.push(snapshot.clone());
    }
}

/// Forwards every event into an unbounded channel for async consumers
#[derive(Debug)]
pub struct ChannelConsumer {
    tx: UnboundedSender<CoordinatorEvent>,
    closed: bool,
}

impl ChannelConsumer {
    pub fn new() -> (Self, UnboundedReceiver<CoordinatorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, closed: false }, rx)
    }

    fn send(&mut self, event: CoordinatorEvent) {
        if self.closed {
            return;
        }
        if self.tx.send(event).is_err() {
            tracing::warn!("Animation event receiver dropped; further events discarded");
            self.closed = true;
        }
    }
}

impl AnimationConsumer for ChannelConsumer {
    fn on_signal(&mut self, signal: &ActionSignal) {
        self.send(CoordinatorEvent::Signal(*signal));
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.send(CoordinatorEvent::Snapshot(snapshot.clone()));
    }
}

/// Logs state changes and signals at debug level
#[derive(Debug, Default)]
pub struct TracingConsumer {
    last_state: Option<PresentationState>,
}

impl TracingConsumer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnimationConsumer for TracingConsumer {
    fn on_signal(&mut self, signal: &ActionSignal) {
        tracing::debug!("signal: {:?}", signal);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        if self.last_state != Some(snapshot.state) {
            tracing::debug!(
                agent = %snapshot.agent.0,
                tick = snapshot.tick,
                "presentation state now {} ({})",
                snapshot.state,
                snapshot.source
            );
            self.last_state = Some(snapshot.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ActionType, AgentId, Limb};

    #[test]
    fn test_recording_consumer_shares_log() {
        let mut consumer = RecordingConsumer::new();
        let recording = consumer.recording();

        consumer.on_signal(&ActionSignal::Begin {
            limb: Limb::Left,
            action: ActionType::Fire,
            tick: 1,
        });
        consumer.on_snapshot(&Snapshot::initial(AgentId::new()));

        assert_eq!(recording.borrow().signals.len(), 1);
        assert_eq!(recording.borrow().states(), vec![(0, PresentationState::Idle)]);
    }

    #[test]
    fn test_channel_consumer_forwards() {
        let (mut consumer, mut rx) = ChannelConsumer::new();
        let snapshot = Snapshot::initial(AgentId::new());
        consumer.on_snapshot(&snapshot);

        assert_eq!(rx.try_recv().unwrap(), CoordinatorEvent::Snapshot(snapshot));
    }

    #[test]
    fn test_channel_consumer_survives_dropped_receiver() {
        let (mut consumer, rx) = ChannelConsumer::new();
        drop(rx);
        consumer.on_snapshot(&Snapshot::initial(AgentId::new()));
        consumer.on_snapshot(&Snapshot::initial(AgentId::new()));
        assert!(consumer.closed);
    }
}
