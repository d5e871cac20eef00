//! Error types for api-client.

use thiserror::Error;

/// Errors returned by [`WalletSetupClient`](crate::WalletSetupClient).
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token is held; log in or register first.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server rejected the token or credentials (401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server rejected the request body (400).
    #[error("{0}")]
    Validation(String),

    /// The request conflicts with existing data (409).
    #[error("{0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
