//! Connection state around a wallet provider.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ConnectorError, Result};
use crate::networks::{add_chain_params, network_name};
use crate::provider::{ProviderEvent, WalletProvider};
use crate::units::{format_ether, is_valid_address};

const EVENT_CAPACITY: usize = 32;

/// Changes the connector reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    /// The wallet's selected account changed.
    AccountChanged(String),
    /// The connection ended: no accounts are exposed, the provider went away,
    /// or [`WalletConnector::disconnect`] was called.
    Disconnected,
    /// The chain changed; cached connection state was discarded and should be
    /// rebuilt with a fresh [`WalletConnector::connect`].
    ReloadRequired { chain_id: u64 },
}

/// Snapshot of a connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    /// Balance in ether, e.g. `"1.5"`.
    pub balance: String,
    pub network: String,
    pub chain_id: u64,
}

#[derive(Debug, Clone)]
struct Connection {
    address: String,
    chain_id: u64,
}

#[derive(Default)]
struct Inner {
    connection: Option<Connection>,
    watcher: Option<JoinHandle<()>>,
}

/// Tracks one wallet connection through a provider.
///
/// Create one per wallet session and pass it to whatever needs it; dropping
/// the connector stops its provider subscription.
pub struct WalletConnector<P> {
    provider: Arc<P>,
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<ConnectorEvent>,
}

impl<P: WalletProvider + 'static> WalletConnector<P> {
    /// Wrap a provider. Nothing is requested until [`connect`](Self::connect).
    pub fn new(provider: P) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider: Arc::new(provider),
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Subscribe to connection changes.
    pub fn events(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }

    /// Request account access and start tracking the wallet.
    ///
    /// Fails with [`ConnectorError::NoProvider`] when the provider cannot be
    /// reached and [`ConnectorError::NoAccounts`] when it exposes no valid
    /// account. Errors reported by the wallet itself, such as a user
    /// rejection, are returned as [`ConnectorError::Rpc`].
    pub async fn connect(&self) -> Result<WalletInfo> {
        let accounts = self
            .provider
            .request_accounts()
            .await
            .map_err(|e| match e {
                rpc @ ConnectorError::Rpc { .. } => rpc,
                other => ConnectorError::NoProvider(other.to_string()),
            })?;

        let address = accounts
            .into_iter()
            .next()
            .filter(|a| is_valid_address(a))
            .ok_or(ConnectorError::NoAccounts)?;

        let chain_id = self.provider.chain_id().await?;

        let watcher = self.spawn_watcher(self.provider.subscribe());
        {
            let mut inner = lock(&self.inner);
            if let Some(previous) = inner.watcher.replace(watcher) {
                previous.abort();
            }
            inner.connection = Some(Connection {
                address: address.clone(),
                chain_id,
            });
        }

        info!(address = %address, chain_id, "Wallet connected");
        self.info().await
    }

    /// Address, ether balance and network of the connected wallet.
    pub async fn info(&self) -> Result<WalletInfo> {
        let connection = lock(&self.inner)
            .connection
            .clone()
            .ok_or(ConnectorError::NotConnected)?;

        let wei = self.provider.get_balance(&connection.address).await?;

        Ok(WalletInfo {
            balance: format_ether(wei),
            network: network_name(connection.chain_id),
            chain_id: connection.chain_id,
            address: connection.address,
        })
    }

    /// Forget the connection and stop listening to the provider.
    pub fn disconnect(&self) {
        let was_connected = {
            let mut inner = lock(&self.inner);
            if let Some(watcher) = inner.watcher.take() {
                watcher.abort();
            }
            inner.connection.take().is_some()
        };

        if was_connected {
            info!("Wallet disconnected");
            let _ = self.events.send(ConnectorEvent::Disconnected);
        }
    }

    /// Ask the wallet to switch to `chain_id`, adding the chain first if the
    /// wallet does not know it. Requires a connection.
    ///
    /// The cached chain is not updated here; the provider's chain change
    /// notification triggers [`ConnectorEvent::ReloadRequired`].
    pub async fn switch_network(&self, chain_id: u64) -> Result<()> {
        if !self.is_connected() {
            return Err(ConnectorError::NotConnected);
        }

        match self.provider.switch_chain(chain_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                let params =
                    add_chain_params(chain_id).ok_or(ConnectorError::UnknownNetwork(chain_id))?;
                info!(chain_id, name = %params.chain_name, "Adding network to wallet");
                self.provider.add_chain(&params).await
            }
            Err(e) => Err(e),
        }
    }

    /// Whether a wallet is connected.
    pub fn is_connected(&self) -> bool {
        lock(&self.inner).connection.is_some()
    }

    /// Connected address, if any.
    pub fn address(&self) -> Option<String> {
        lock(&self.inner).connection.as_ref().map(|c| c.address.clone())
    }

    /// Chain id of the connection, if any.
    pub fn chain_id(&self) -> Option<u64> {
        lock(&self.inner).connection.as_ref().map(|c| c.chain_id)
    }

    fn spawn_watcher(&self, mut rx: mpsc::Receiver<ProviderEvent>) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                debug!(?event, "Handling provider event");
                let Some(reported) = apply_event(&inner, event) else {
                    continue;
                };

                // Anything but an account change ends the connection; dropping
                // the receiver ends the provider subscription.
                let ended = !matches!(reported, ConnectorEvent::AccountChanged(_));
                let _ = events.send(reported);
                if ended {
                    debug!("Provider subscription closed");
                    break;
                }
            }
        })
    }
}

/// Update connection state for a provider event and return what to report.
fn apply_event(inner: &Mutex<Inner>, event: ProviderEvent) -> Option<ConnectorEvent> {
    let mut inner = lock(inner);
    inner.connection.as_ref()?;

    match event {
        ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
            Some(address) if is_valid_address(&address) => {
                let connection = inner.connection.as_mut()?;
                if connection.address == address {
                    return None;
                }
                connection.address = address.clone();
                info!(address = %address, "Wallet account changed");
                Some(ConnectorEvent::AccountChanged(address))
            }
            _ => {
                info!("Wallet exposed no accounts; disconnecting");
                inner.connection = None;
                Some(ConnectorEvent::Disconnected)
            }
        },
        ProviderEvent::ChainChanged(chain_id) => {
            info!(chain_id, "Wallet chain changed");
            inner.connection = None;
            Some(ConnectorEvent::ReloadRequired { chain_id })
        }
        ProviderEvent::Disconnected => {
            warn!("Wallet provider disconnected");
            inner.connection = None;
            Some(ConnectorEvent::Disconnected)
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

impl<P> Drop for WalletConnector<P> {
    fn drop(&mut self) {
        if let Some(watcher) = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .watcher
            .take()
        {
            watcher.abort();
        }
    }
}

impl<P> std::fmt::Debug for WalletConnector<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("WalletConnector")
            .field("connection", &inner.connection)
            .finish()
    }
}
