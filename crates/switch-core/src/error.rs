//! Error types for switch operations.

use thiserror::Error;

/// Errors that can occur while managing switches.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Create payload failed validation.
    #[error("invalid switch: {0}")]
    InvalidInput(String),

    /// No switch with the given id.
    #[error("switch not found: {id}")]
    NotFound { id: String },

    /// The switch has expired or was deactivated and can no longer be checked in.
    #[error("switch is inactive: {id}")]
    Inactive { id: String },

    /// Reading or writing the local store failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for switch operations.
pub type Result<T> = std::result::Result<T, SwitchError>;
