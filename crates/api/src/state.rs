//! Application state shared across handlers.

use chrono::Duration;
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// How long issued sessions stay valid.
    pub token_ttl: Duration,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, token_ttl_hours: u32) -> Self {
        Self {
            db,
            token_ttl: Duration::hours(i64::from(token_ttl_hours)),
        }
    }
}
