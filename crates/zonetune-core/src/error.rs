//! Core error types for zonetune-core.
//!
//! Collaborator failures never abort a session: the session runtime catches
//! them at the call site and converts them into event-sink records. These
//! types exist so the traits have a structured error surface to report.

use thiserror::Error;

/// Core error type for zonetune-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Sensor or playback collaborator errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors reported by sensor and playback collaborators.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Collaborator session could not be started
    #[error("Failed to start {service} session: {message}")]
    SessionStart { service: String, message: String },

    /// Collaborator session could not be ended cleanly
    #[error("Failed to end {service} session: {message}")]
    SessionEnd { service: String, message: String },

    /// A playback command was rejected
    #[error("Playback command failed: {0}")]
    Playback(String),

    /// Collaborator is not available on this device
    #[error("{service} is not available")]
    Unavailable { service: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
