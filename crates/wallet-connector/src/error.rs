//! Error types for wallet-connector.

use thiserror::Error;

/// Provider error code for a request the user rejected.
pub const USER_REJECTED: i64 = 4001;

/// Provider error code for a chain the wallet does not know yet.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Errors that can occur when talking to a wallet provider.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON-RPC error response from the provider.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// No wallet provider could be reached.
    #[error("No wallet provider available. Please install MetaMask or another Ethereum wallet: {0}")]
    NoProvider(String),

    /// The provider granted no usable account.
    #[error("No accounts found. Please unlock your wallet and try again.")]
    NoAccounts,

    /// No add-chain configuration exists for this chain.
    #[error("Unknown network: chain {0}")]
    UnknownNetwork(u64),

    /// An operation needed a connection and there was none.
    #[error("Wallet not connected")]
    NotConnected,

    /// The provider answered with something unparseable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ConnectorError {
    /// Whether the provider reported a chain it does not recognize.
    pub fn is_unrecognized_chain(&self) -> bool {
        matches!(self, ConnectorError::Rpc { code, .. } if *code == UNRECOGNIZED_CHAIN)
    }

    /// Whether the user rejected the request in their wallet.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ConnectorError::Rpc { code, .. } if *code == USER_REJECTED)
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
