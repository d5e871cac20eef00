//! Connect to a wallet and print account and chain changes.
//!
//! Run with: cargo run --example watch_wallet
//!
//! Configuration via .env file or environment variables:
//!   WALLET_RPC_URL  - JSON-RPC endpoint of the wallet (default: http://127.0.0.1:8545)
//!   SWITCH_CHAIN_ID - If set, ask the wallet to switch to this chain after connecting

use std::env;
use std::time::Duration;

use wallet_connector::{ConnectorEvent, JsonRpcProvider, WalletConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (from project root)
    let _ = dotenvy::from_path("../../.env");

    let url = env::var("WALLET_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());
    println!("Connecting to wallet at {}...", url);

    let provider = JsonRpcProvider::new(&url)?.with_poll_interval(Duration::from_secs(1));
    let connector = WalletConnector::new(provider);
    let mut events = connector.events();

    let info = connector.connect().await?;
    println!(
        "Connected: {} on {} (chain {}), balance {} ETH",
        info.address, info.network, info.chain_id, info.balance
    );

    if let Ok(chain) = env::var("SWITCH_CHAIN_ID") {
        let chain_id: u64 = chain.parse()?;
        println!("Switching to chain {}...", chain_id);
        connector.switch_network(chain_id).await?;
    }

    println!("Watching for changes. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ConnectorEvent::AccountChanged(address)) => println!("Account changed: {}", address),
                Ok(ConnectorEvent::ReloadRequired { chain_id }) => {
                    println!("Chain changed to {}, reconnecting...", chain_id);
                    let info = connector.connect().await?;
                    println!("Reconnected on {}", info.network);
                }
                Ok(ConnectorEvent::Disconnected) => {
                    println!("Wallet disconnected");
                    break;
                }
                Err(e) => {
                    println!("Event stream ended: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    connector.disconnect();
    Ok(())
}
