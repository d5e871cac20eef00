//! Wallet setup operations.
//!
//! Each user has at most one active setup. Saving replaces the active setup
//! in place; deleting only clears its `is_active` flag so earlier setups stay
//! on record.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{WalletSetup, WalletSetupRecord, WalletSetupRow};
use crate::validation::validate_wallet_setup;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, main_wallet, beneficiaries, backup_wallet,
           is_active, created_at, updated_at
    FROM wallet_setups
"#;

/// Get the user's active setup, if any.
pub async fn get_active_setup(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<WalletSetupRecord>> {
    let query = format!("{} WHERE user_id = ? AND is_active = 1", SELECT_COLUMNS);

    let row = sqlx::query_as::<_, WalletSetupRow>(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.map(WalletSetupRecord::try_from)
        .transpose()
        .map_err(DatabaseError::from)
}

/// Validate and store `setup` as the user's active setup.
///
/// Updates the existing active row when there is one, otherwise inserts a new
/// row. The main wallet becomes the user's linked wallet in the same
/// transaction. Nothing is written when validation fails or the user does
/// not exist.
pub async fn save_active_setup(
    pool: &SqlitePool,
    user_id: &str,
    setup: &WalletSetup,
) -> Result<WalletSetupRecord> {
    validate_wallet_setup(setup)?;
    let beneficiaries = serde_json::to_string(&setup.beneficiaries)?;

    let mut tx = pool.begin().await?;

    let linked = sqlx::query("UPDATE users SET wallet_address = ? WHERE id = ?")
        .bind(&setup.main_wallet)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if linked.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: user_id.to_string(),
        });
    }

    let updated = sqlx::query(
        r#"
        UPDATE wallet_setups
        SET main_wallet = ?, beneficiaries = ?, backup_wallet = ?,
            updated_at = datetime('now')
        WHERE user_id = ? AND is_active = 1
        "#,
    )
    .bind(&setup.main_wallet)
    .bind(&beneficiaries)
    .bind(&setup.backup_wallet)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            r#"
            INSERT INTO wallet_setups (user_id, main_wallet, beneficiaries, backup_wallet)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&setup.main_wallet)
        .bind(&beneficiaries)
        .bind(&setup.backup_wallet)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        user_id,
        beneficiaries = setup.beneficiaries.len(),
        "Saved wallet setup"
    );

    get_active_setup(pool, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "WalletSetup",
            id: user_id.to_string(),
        })
}

/// Deactivate the user's active setup. Returns whether one was active.
pub async fn deactivate_setup(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE wallet_setups
        SET is_active = 0, updated_at = datetime('now')
        WHERE user_id = ? AND is_active = 1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All setups for a user, newest first, including deactivated ones.
pub async fn list_setups(pool: &SqlitePool, user_id: &str) -> Result<Vec<WalletSetupRecord>> {
    let query = format!("{} WHERE user_id = ? ORDER BY id DESC", SELECT_COLUMNS);

    let rows = sqlx::query_as::<_, WalletSetupRow>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|row| WalletSetupRecord::try_from(row).map_err(DatabaseError::from))
        .collect()
}
