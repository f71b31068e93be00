//! The coordinator façade and its outbound surface
//!
//! One `Coordinator` per agent. Gameplay systems hold a reference to it and
//! submit requests; animation consumers subscribe to its snapshots.

pub mod consumer;
pub mod coordinator;
pub mod history;
pub mod snapshot;

pub use consumer::{
    AnimationConsumer, ChannelConsumer, CoordinatorEvent, Recording, RecordingConsumer,
    TracingConsumer,
};
pub use coordinator::Coordinator;
pub use history::TransitionHistory;
pub use snapshot::{LimbSnapshot, Snapshot};
