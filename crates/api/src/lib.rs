//! HTTP API for wallet setups and accounts.
//!
//! Serves register/login/logout under `/api/auth` and the caller's
//! inheritance wallet setup under `/api/wallet-setup`, backed by SQLite.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::Router;
use chrono::Utc;
use database::{session, Database};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

/// How often expired sessions are purged.
pub const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Build the application with state attached.
pub fn app(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Periodically delete expired sessions in the background.
pub fn spawn_session_purger(db: Database, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        info!(period = ?period, "Starting session purger");

        loop {
            ticker.tick().await;
            match session::purge_expired(db.pool(), Utc::now().timestamp()).await {
                Ok(0) => debug!("No expired sessions"),
                Ok(count) => info!(count, "Purged expired sessions"),
                Err(e) => error!("Session purge failed: {}", e),
            }
        }
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use database::Session;

    #[tokio::test]
    async fn test_session_purger_removes_expired_sessions() {
        let (app, state) = test_support::test_app_with_state().await;
        let token = test_support::register(&app, "ada@example.com").await;
        let live_hash = auth::hash_token(&token);

        let live = session::find_active_session(state.db.pool(), &live_hash, 0)
            .await
            .unwrap()
            .unwrap();
        session::create_session(
            state.db.pool(),
            &Session {
                token_hash: "stale".to_string(),
                user_id: live.user_id.clone(),
                created_at: 0,
                expires_at: 1,
            },
        )
        .await
        .unwrap();

        let handle = spawn_session_purger(state.db.clone(), Duration::from_secs(3600));
        // The first tick fires immediately
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        assert!(session::find_active_session(state.db.pool(), "stale", 0)
            .await
            .unwrap()
            .is_none());
        assert!(session::find_active_session(state.db.pool(), &live_hash, 0)
            .await
            .unwrap()
            .is_some());
    }
}
