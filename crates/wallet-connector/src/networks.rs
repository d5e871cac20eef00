//! Known networks and the parameters needed to add them to a wallet.

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// Networks with a display name: `(chain id, name)`.
pub const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (1, "Ethereum Mainnet"),
    (5, "Goerli Testnet"),
    (11155111, "Sepolia Testnet"),
    (137, "Polygon"),
    (42161, "Arbitrum One"),
    (10, "Optimism"),
    (56, "BNB Chain"),
];

/// Human-readable name of a chain; unknown chains are `Chain <id>`.
pub fn network_name(chain_id: u64) -> String {
    KNOWN_NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Chain {}", chain_id))
}

/// `0x`-prefixed lowercase hex form used on the wire.
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("0x{:x}", chain_id)
}

/// Parse a chain id given as `0x` hex or as a decimal string.
pub fn parse_chain_id(value: &str) -> Result<u64> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| ConnectorError::InvalidResponse(format!("bad chain id {:?}", value)))
}

/// Native currency of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// `wallet_addEthereumChain` parameter object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl AddChainParams {
    fn new(chain_id: u64, symbol: &str, rpc_url: &str, explorer_url: &str) -> Self {
        Self {
            chain_id: chain_id_hex(chain_id),
            chain_name: network_name(chain_id),
            native_currency: NativeCurrency {
                name: symbol.to_string(),
                symbol: symbol.to_string(),
                decimals: 18,
            },
            rpc_urls: vec![rpc_url.to_string()],
            block_explorer_urls: vec![explorer_url.to_string()],
        }
    }
}

/// Add-chain configuration for networks wallets may not ship with.
pub fn add_chain_params(chain_id: u64) -> Option<AddChainParams> {
    let params = match chain_id {
        137 => AddChainParams::new(137, "MATIC", "https://polygon-rpc.com", "https://polygonscan.com"),
        42161 => AddChainParams::new(
            42161,
            "ETH",
            "https://arb1.arbitrum.io/rpc",
            "https://arbiscan.io",
        ),
        10 => AddChainParams::new(
            10,
            "ETH",
            "https://mainnet.optimism.io",
            "https://optimistic.etherscan.io",
        ),
        56 => AddChainParams::new(
            56,
            "BNB",
            "https://bsc-dataseed.binance.org",
            "https://bscscan.com",
        ),
        _ => return None,
    };
    Some(params)
}
