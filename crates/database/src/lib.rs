//! SQLite persistence for the dead man's switch service.
//!
//! This crate provides async database operations for user accounts, bearer
//! sessions, and inheritance wallet setups using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{models::{Beneficiary, NewUser, WalletSetup}, user, wallet_setup, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:deadman.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let owner = user::create_user(db.pool(), &NewUser {
//!         id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!         email: "owner@example.com".to_string(),
//!         name: "Owner".to_string(),
//!         password_hash: "…".to_string(),
//!         password_salt: "…".to_string(),
//!     }).await?;
//!
//!     let setup = WalletSetup {
//!         main_wallet: "0x8617E340B3D01FA5F11F306F4090FD50E238070D".to_string(),
//!         beneficiaries: vec![Beneficiary {
//!             id: "1".to_string(),
//!             name: "Heir".to_string(),
//!             wallet_address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
//!             percentage: 100,
//!             email: None,
//!             phone: None,
//!         }],
//!         backup_wallet: String::new(),
//!     };
//!     wallet_setup::save_active_setup(db.pool(), &owner.id, &setup).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod session;
pub mod user;
pub mod validation;
pub mod wallet_setup;

pub use error::{DatabaseError, Result};
pub use models::{
    Beneficiary, Credentials, NewUser, Session, User, WalletSetup, WalletSetupRecord,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    pub const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/deadman.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// In-memory databases are private to a connection, so they always get a
    /// single connection that is never recycled.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:");
        let pool_size = if in_memory { 1 } else { pool_size };

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30));
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
