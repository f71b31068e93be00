use thiserror::Error;

/// Errors from the ambient surface (configuration, scripts, output).
///
/// Gameplay requests never fail with an error: a denied start is a plain
/// `false`, and stops/completions are always accepted.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
