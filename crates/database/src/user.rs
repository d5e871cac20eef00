//! User account operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{Credentials, NewUser, User};

/// Create a new user. Emails are stored lowercase.
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<User> {
    let email = user.email.trim().to_lowercase();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, password_salt)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&email)
    .bind(user.name.trim())
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "User",
                    id: email.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_user(pool, &user.id).await
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, wallet_address, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: id.to_string(),
    })
}

/// Get a user by email, case-insensitively.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    let email = email.trim().to_lowercase();

    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, wallet_address, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.clone(),
    })
}

/// Look up stored password material by email.
///
/// Returns `None` for unknown emails so callers can answer with a generic
/// credentials error.
pub async fn get_credentials_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Credentials>> {
    let credentials = sqlx::query_as::<_, Credentials>(
        r#"
        SELECT id AS user_id, password_hash, password_salt
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;

    Ok(credentials)
}

/// Link a wallet address to a user, or clear it with `None`.
pub async fn update_wallet_address(
    pool: &SqlitePool,
    id: &str,
    wallet_address: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET wallet_address = ?
        WHERE id = ?
        "#,
    )
    .bind(wallet_address)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
