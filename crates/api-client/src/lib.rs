//! Typed client for the wallet-setup API.
//!
//! # Example
//!
//! ```no_run
//! use api_client::{Beneficiary, WalletSetup, WalletSetupClient};
//!
//! # async fn example() -> api_client::Result<()> {
//! let mut client = WalletSetupClient::new("http://127.0.0.1:8790")?;
//! client.login("owner@example.com", "correct horse").await?;
//!
//! let mut setup = client.load().await?;
//! setup.main_wallet = "0x8617E340B3D01FA5F11F306F4090FD50E238070D".to_string();
//! setup.beneficiaries = vec![Beneficiary {
//!     name: "Heir".to_string(),
//!     wallet_address: "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
//!     percentage: 100,
//!     ..Default::default()
//! }];
//! client.save(&setup).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::WalletSetupClient;
pub use error::{ClientError, Result};
pub use types::{Beneficiary, User, WalletSetup};
