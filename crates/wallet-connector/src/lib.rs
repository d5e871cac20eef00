//! Wallet connection utility.
//!
//! This crate wraps an EIP-1193 style wallet provider. It defines:
//!
//! - [`WalletProvider`] - the provider trait (`eth_requestAccounts`, `eth_chainId`, ...)
//! - [`JsonRpcProvider`] - a provider reached over HTTP JSON-RPC 2.0
//! - [`WalletConnector`] - connection state plus account and chain change tracking
//!
//! # Example
//!
//! ```no_run
//! use wallet_connector::{ConnectorEvent, JsonRpcProvider, WalletConnector};
//!
//! # async fn example() -> wallet_connector::Result<()> {
//! let provider = JsonRpcProvider::new("http://127.0.0.1:8545")?;
//! let connector = WalletConnector::new(provider);
//! let mut events = connector.events();
//!
//! let info = connector.connect().await?;
//! println!("{} holds {} ETH on {}", info.address, info.balance, info.network);
//!
//! while let Ok(event) = events.recv().await {
//!     if let ConnectorEvent::ReloadRequired { .. } = event {
//!         connector.connect().await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod connector;
mod error;
mod json_rpc;
pub mod networks;
mod provider;
pub mod units;

pub use connector::{ConnectorEvent, WalletConnector, WalletInfo};
pub use error::{ConnectorError, Result, UNRECOGNIZED_CHAIN, USER_REJECTED};
pub use json_rpc::{JsonRpcProvider, DEFAULT_POLL_INTERVAL};
pub use networks::{network_name, AddChainParams};
pub use provider::{ProviderEvent, WalletProvider};

// Re-export async_trait for provider implementations
pub use async_trait::async_trait;
