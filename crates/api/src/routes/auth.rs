//! Account routes: register, login, logout and the current user.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use database::validation::{validate_email, validate_name, validate_password};
use database::{session, user, DatabaseError, NewUser, User};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token plus the account it belongs to.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Plain confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Create an account and log it in.
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_name(&req.name)?;

    let salt = auth::generate_salt();
    let new_user = NewUser {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        name: req.name,
        password_hash: auth::hash_password(&req.password, &salt),
        password_salt: salt,
    };

    let user = user::create_user(state.db.pool(), &new_user)
        .await
        .map_err(|e| match e {
            DatabaseError::AlreadyExists { .. } => {
                ApiError::Conflict("Email already registered".to_string())
            }
            other => ApiError::Database(other),
        })?;

    let token = auth::issue_token(&state, &user.id).await?;
    info!(user_id = %user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Exchange email and password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = payload?;
    let credentials = user::get_credentials_by_email(state.db.pool(), &req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !auth::verify_password(
        &req.password,
        &credentials.password_salt,
        &credentials.password_hash,
    ) {
        return Err(ApiError::InvalidCredentials);
    }

    let user = user::get_user(state.db.pool(), &credentials.user_id).await?;
    let token = auth::issue_token(&state, &user.id).await?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// Revoke the presented token.
pub async fn logout(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<MessageResponse>> {
    session::delete_session(state.db.pool(), &caller.token_hash).await?;
    info!(user_id = %caller.user_id, "User logged out");

    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

/// The account behind the presented token.
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> Result<Json<User>> {
    let user = user::get_user(state.db.pool(), &caller.user_id).await?;
    Ok(Json(user))
}
