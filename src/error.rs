//! Error types for Lock-In Core

use thiserror::Error;

/// Errors that can occur while evaluating or driving a session
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid metric: {0}")]
    InvalidMetrics(String),

    #[error("Goal duration must be a positive number of minutes, got {0}")]
    InvalidGoal(f64),
}
