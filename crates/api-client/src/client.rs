//! Wallet-setup API client.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::types::{AuthResponse, ErrorBody, SaveResponse, User, WalletSetup};

/// Client for the wallet-setup and account endpoints.
///
/// Holds the bearer token after [`login`](Self::login) or
/// [`register`](Self::register). Requests are not retried.
#[derive(Clone)]
pub struct WalletSetupClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl WalletSetupClient {
    /// Create a client for the API at `base_url`, e.g. `http://127.0.0.1:8790`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a preconfigured HTTP client.
    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: None,
        }
    }

    /// Use an existing bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The bearer token currently held.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forget the bearer token without contacting the server.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create an account and keep its token.
    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User> {
        let request = self
            .request(Method::POST, "/api/auth/register")
            .json(&json!({"email": email, "password": password, "name": name}));
        let auth: AuthResponse = decode(request.send().await?).await?;

        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Log in and keep the token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let request = self
            .request(Method::POST, "/api/auth/login")
            .json(&json!({"email": email, "password": password}));
        let auth: AuthResponse = decode(request.send().await?).await?;

        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// Revoke the token on the server and forget it.
    pub async fn logout(&mut self) -> Result<()> {
        let request = self.authorized(Method::POST, "/api/auth/logout")?;
        let _: serde_json::Value = decode(request.send().await?).await?;
        self.token = None;
        Ok(())
    }

    /// Fetch the caller's wallet setup. Returns the empty setup if none is saved.
    pub async fn load(&self) -> Result<WalletSetup> {
        let request = self.authorized(Method::GET, "/api/wallet-setup")?;
        decode(request.send().await?).await
    }

    /// Save the caller's wallet setup and return it as stored.
    pub async fn save(&self, setup: &WalletSetup) -> Result<WalletSetup> {
        let request = self
            .authorized(Method::POST, "/api/wallet-setup")?
            .json(setup);
        let saved: SaveResponse = decode(request.send().await?).await?;
        Ok(saved.wallet_setup)
    }

    /// Deactivate the caller's wallet setup.
    pub async fn delete(&self) -> Result<()> {
        let request = self.authorized(Method::DELETE, "/api/wallet-setup")?;
        let _: serde_json::Value = decode(request.send().await?).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }
}

/// Decode a success body, or map an error status to a typed error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    warn!(status = status.as_u16(), "Request failed: {}", message);

    Err(match status {
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

impl std::fmt::Debug for WalletSetupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSetupClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
