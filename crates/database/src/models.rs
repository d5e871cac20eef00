//! Database models.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID assigned at registration.
    pub id: String,
    /// Login email, stored lowercase.
    pub email: String,
    /// Display name
    pub name: String,
    /// Wallet linked to the account, if any.
    pub wallet_address: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Stored password material for a user.
#[derive(Debug, Clone, FromRow)]
pub struct Credentials {
    pub user_id: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// A bearer-token session. Only the token digest is stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub expires_at: i64,
}

/// A recipient of a share of the user's assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wallet_address: String,
    /// Whole percent, 1 to 100.
    #[serde(default, deserialize_with = "whole_percentage")]
    pub percentage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Beneficiary {
    /// Share in basis points (hundredths of a percent), as used by the vault contract.
    pub fn share_bps(&self) -> u32 {
        self.percentage * 100
    }
}

/// The user-facing shape of a wallet setup.
///
/// An empty `backup_wallet` means none was configured. `Default` is the
/// documented empty state returned to users who have not saved anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSetup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_wallet: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub beneficiaries: Vec<Beneficiary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backup_wallet: String,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any JSON number that is a non-negative whole value; range checks
/// happen in validation.
fn whole_percentage<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(0);
    };

    if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!(
            "percentage must be a whole number from 1 to 100, got {}",
            value
        )));
    }

    Ok(value as u32)
}

/// A stored wallet setup row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSetupRecord {
    pub id: i64,
    pub user_id: String,
    pub setup: WalletSetup,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Raw row; beneficiaries are still JSON text.
#[derive(Debug, FromRow)]
pub(crate) struct WalletSetupRow {
    pub id: i64,
    pub user_id: String,
    pub main_wallet: String,
    pub beneficiaries: String,
    pub backup_wallet: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<WalletSetupRow> for WalletSetupRecord {
    type Error = serde_json::Error;

    fn try_from(row: WalletSetupRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            setup: WalletSetup {
                main_wallet: row.main_wallet,
                beneficiaries: serde_json::from_str(&row.beneficiaries)?,
                backup_wallet: row.backup_wallet,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_fields_read_as_empty() {
        let setup: WalletSetup = serde_json::from_value(json!({
            "mainWallet": "0x8617E340B3D01FA5F11F306F4090FD50E238070D",
            "beneficiaries": null,
            "backupWallet": null,
        }))
        .unwrap();
        assert!(setup.beneficiaries.is_empty());
        assert_eq!(setup.backup_wallet, "");

        let heir: Beneficiary =
            serde_json::from_value(json!({"name": null, "percentage": null})).unwrap();
        assert_eq!(heir.name, "");
        assert_eq!(heir.percentage, 0);
    }

    #[test]
    fn test_percentage_must_be_whole() {
        let heir: Beneficiary = serde_json::from_value(json!({"percentage": 40.0})).unwrap();
        assert_eq!(heir.percentage, 40);

        for bad in [json!(50.5), json!(-5)] {
            let err = serde_json::from_value::<Beneficiary>(json!({"percentage": bad}))
                .unwrap_err();
            assert!(err.to_string().contains("whole number"), "got: {}", err);
        }
    }
}
