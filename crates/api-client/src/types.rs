//! Wire types for the wallet-setup API.

use serde::{Deserialize, Serialize};

/// A recipient of a share of the user's assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    /// Left empty for new beneficiaries; the server assigns one.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub wallet_address: String,
    /// Whole percent, 1 to 100.
    pub percentage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A user's inheritance wallet configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSetup {
    #[serde(default)]
    pub main_wallet: String,
    #[serde(default)]
    pub beneficiaries: Vec<Beneficiary>,
    /// Empty when no backup wallet is configured.
    #[serde(default)]
    pub backup_wallet: String,
}

impl WalletSetup {
    /// Whether nothing has been configured yet.
    pub fn is_empty(&self) -> bool {
        self.main_wallet.is_empty() && self.beneficiaries.is_empty()
    }

    /// Sum of beneficiary percentages.
    pub fn total_percentage(&self) -> u64 {
        self.beneficiaries.iter().map(|b| u64::from(b.percentage)).sum()
    }
}

/// An account as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveResponse {
    pub wallet_setup: WalletSetup,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
