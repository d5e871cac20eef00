//! Wallet provider reached over HTTP JSON-RPC 2.0.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{ConnectorError, Result};
use crate::networks::{chain_id_hex, parse_chain_id, AddChainParams};
use crate::provider::{ProviderEvent, WalletProvider};
use crate::units::parse_quantity;

/// Default interval between account/chain polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const EVENT_BUFFER: usize = 16;

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Serialize)]
struct RpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<T>,
    id: u64,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// A wallet provider behind an HTTP JSON-RPC endpoint.
///
/// Change notifications are produced by polling `eth_accounts` and
/// `eth_chainId`.
#[derive(Clone)]
pub struct JsonRpcProvider {
    http: Client,
    url: String,
    request_id: Arc<AtomicU64>,
    poll_interval: Duration,
}

impl JsonRpcProvider {
    /// Create a provider for the JSON-RPC endpoint at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ConnectorError::Http)?;

        Ok(Self::with_client(http, url))
    }

    /// Create a provider with a preconfigured HTTP client.
    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            request_id: Arc::new(AtomicU64::new(1)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how often subscriptions poll for changes.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Accounts currently exposed, without prompting (`eth_accounts`).
    pub async fn accounts(&self) -> Result<Vec<String>> {
        self.rpc_call::<(), _>("eth_accounts", None).await
    }

    /// Make a JSON-RPC call. A `null` result decodes as `()` or `Option::None`.
    async fn rpc_call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<P>,
    ) -> Result<R> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!("RPC call: {} (id={})", method, id);

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(ConnectorError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::InvalidResponse(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let rpc_response: RpcResponse = response.json().await.map_err(ConnectorError::Http)?;

        if let Some(error) = rpc_response.error {
            return Err(ConnectorError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(serde_json::from_value(
            rpc_response.result.unwrap_or(Value::Null),
        )?)
    }

    async fn snapshot(&self) -> Result<(Vec<String>, u64)> {
        let accounts = self.accounts().await?;
        let chain_id = self.chain_id().await?;
        Ok((accounts, chain_id))
    }

    /// Poll until the receiver goes away, forwarding changes as events.
    ///
    /// The first successful poll sets the baseline and emits nothing. A failed
    /// poll after a successful one emits `Disconnected` and resets the baseline.
    async fn watch(self, tx: mpsc::Sender<ProviderEvent>) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(url = %self.url, poll_interval = ?self.poll_interval, "Starting provider watcher");

        let mut last: Option<(Vec<String>, u64)> = None;
        let mut reachable = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tx.closed() => break,
            }

            let mut events = Vec::new();
            match self.snapshot().await {
                Ok((accounts, chain_id)) => {
                    reachable = true;
                    if let Some((last_accounts, last_chain)) = &last {
                        if *last_chain != chain_id {
                            events.push(ProviderEvent::ChainChanged(chain_id));
                        }
                        if *last_accounts != accounts {
                            events.push(ProviderEvent::AccountsChanged(accounts.clone()));
                        }
                    }
                    last = Some((accounts, chain_id));
                }
                Err(e) => {
                    if reachable {
                        warn!("Wallet provider unreachable: {}", e);
                        events.push(ProviderEvent::Disconnected);
                    }
                    reachable = false;
                    last = None;
                }
            }

            for event in events {
                debug!(?event, "Provider event");
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        }

        debug!("Provider watcher stopped");
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        self.rpc_call::<(), _>("eth_requestAccounts", None).await
    }

    async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.rpc_call::<(), _>("eth_chainId", None).await?;
        parse_chain_id(&hex)
    }

    async fn get_balance(&self, address: &str) -> Result<u128> {
        let hex: String = self
            .rpc_call("eth_getBalance", Some(json!([address, "latest"])))
            .await?;
        parse_quantity(&hex)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<()> {
        self.rpc_call(
            "wallet_switchEthereumChain",
            Some(json!([{ "chainId": chain_id_hex(chain_id) }])),
        )
        .await
    }

    async fn add_chain(&self, params: &AddChainParams) -> Result<()> {
        self.rpc_call("wallet_addEthereumChain", Some([params])).await
    }

    fn subscribe(&self) -> mpsc::Receiver<ProviderEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(self.clone().watch(tx));
        rx
    }
}

impl std::fmt::Debug for JsonRpcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcProvider")
            .field("url", &self.url)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
