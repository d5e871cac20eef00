//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use database::Database;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Session lifetime in hours.
    pub token_ttl_hours: u32,
    /// Database connection pool size.
    pub pool_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `DEADMAN_API_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:deadman.db?mode=rwc` |
    /// | `DEADMAN_TOKEN_TTL_HOURS` | Session lifetime in hours | `720` |
    /// | `DEADMAN_DB_POOL_SIZE` | Database pool size | `20` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("DEADMAN_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:deadman.db?mode=rwc".to_string());

        let token_ttl_hours = match env::var("DEADMAN_TOKEN_TTL_HOURS") {
            Ok(value) => parse_positive(&value).ok_or(ConfigError::InvalidTokenTtl(value))?,
            Err(_) => 720,
        };

        let pool_size = match env::var("DEADMAN_DB_POOL_SIZE") {
            Ok(value) => parse_positive(&value).ok_or(ConfigError::InvalidPoolSize(value))?,
            Err(_) => Database::DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            addr,
            database_url,
            token_ttl_hours,
            pool_size,
        })
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DEADMAN_API_ADDR format")]
    InvalidAddr,

    #[error("DEADMAN_TOKEN_TTL_HOURS must be a positive integer, got {0:?}")]
    InvalidTokenTtl(String),

    #[error("DEADMAN_DB_POOL_SIZE must be a positive integer, got {0:?}")]
    InvalidPoolSize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("48"), Some(48));
        assert_eq!(parse_positive(" 1 "), Some(1));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-3"), None);
        assert_eq!(parse_positive("soon"), None);
    }
}
