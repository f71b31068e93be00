pub mod config;
pub mod error;
pub mod types;

pub use config::{CoordinatorConfig, TickDurations};
pub use error::{CoordinatorError, Result};
