use thiserror::Error;

/// Top-level error type for the Waypoint platform.
#[derive(Error, Debug)]
pub enum WaypointError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Unknown child handling policy: {0}")]
    UnknownChildHandling(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for WaypointError {
    fn from(err: config::ConfigError) -> Self {
        WaypointError::Config(err.to_string())
    }
}
