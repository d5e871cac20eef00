//! Route handlers for the API.

pub mod auth;
pub mod health;
pub mod wallet_setup;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Accounts
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Wallet setup
        .route(
            "/api/wallet-setup",
            get(wallet_setup::get_setup)
                .post(wallet_setup::save_setup)
                .delete(wallet_setup::delete_setup),
        )
}
