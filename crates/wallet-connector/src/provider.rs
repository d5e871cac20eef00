//! The wallet provider abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::networks::AddChainParams;

/// Change notifications pushed by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of exposed accounts changed. Empty means the wallet locked or
    /// revoked access.
    AccountsChanged(Vec<String>),
    /// The active chain changed.
    ChainChanged(u64),
    /// The provider went away.
    Disconnected,
}

/// An EIP-1193 style wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet to expose its accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Currently selected chain id (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64>;

    /// Balance of `address` in wei (`eth_getBalance`).
    async fn get_balance(&self, address: &str) -> Result<u128>;

    /// Ask the wallet to switch chains (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<()>;

    /// Ask the wallet to add a chain (`wallet_addEthereumChain`).
    async fn add_chain(&self, params: &AddChainParams) -> Result<()>;

    /// Start receiving change notifications.
    ///
    /// The subscription ends when the receiver is dropped.
    fn subscribe(&self) -> mpsc::Receiver<ProviderEvent>;
}
