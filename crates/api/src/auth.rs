//! Bearer tokens, password digests and the authenticated-user extractor.
//!
//! Password hashing here is a salted SHA-256 digest. It keeps plaintext out of
//! the database but is not a password KDF.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use database::{session, Session};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Generate an opaque bearer token: 64 lowercase hex characters.
pub fn generate_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Digest stored in place of a bearer token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Generate a fresh password salt.
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted password digest.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password attempt against a stored digest.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Create a session for `user_id` and return the bearer token.
pub async fn issue_token(state: &AppState, user_id: &str) -> Result<String> {
    let token = generate_token();
    let now = Utc::now();

    session::create_session(
        state.db.pool(),
        &Session {
            token_hash: hash_token(&token),
            user_id: user_id.to_string(),
            created_at: now.timestamp(),
            expires_at: (now + state.token_ttl).timestamp(),
        },
    )
    .await?;

    Ok(token)
}

/// The caller resolved from a live session.
///
/// Extracting this rejects the request with 401 unless the bearer token maps
/// to an unexpired session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    /// Digest of the presented token.
    pub token_hash: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let token_hash = hash_token(token);

        let session =
            session::find_active_session(state.db.pool(), &token_hash, Utc::now().timestamp())
                .await?
                .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            user_id: session.user_id,
            token_hash,
        })
    }
}
