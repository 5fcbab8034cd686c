//! Main NicePlay backend client.

use crate::auth::AuthClient;
use crate::error::{ClientError, Result};
use crate::playlists::PlaylistClient;
use crate::types::{ApiConfig, UserInfo};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Main client for the NicePlay backend.
///
/// The backend keeps the login session in a cookie, so the underlying HTTP
/// client carries a cookie store. Cloning is cheap and clones share both the
/// connection pool and the logged-in user.
///
/// # Example
///
/// ```ignore
/// use niceplay_client::{ApiConfig, NicePlayClient};
///
/// let client = NicePlayClient::new(ApiConfig::new("http://localhost:8080"))?;
/// let user = client.login("alice", "secret").await?;
/// let banners = client.playlists().get_banner_songs().await?;
/// ```
#[derive(Clone)]
pub struct NicePlayClient {
    http: Client,
    base_url: String,
    user: Arc<RwLock<Option<UserInfo>>>,
}

impl NicePlayClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5).min(config.timeout))
            .cookie_store(true)
            .user_agent(format!("NicePlay/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            http,
            base_url,
            user: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the normalized server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Check if a user is logged in.
    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    /// The logged-in user, if any.
    pub async fn current_user(&self) -> Option<UserInfo> {
        self.user.read().await.clone()
    }

    /// Login with an email or username and password.
    ///
    /// On success the user is remembered for library calls.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<UserInfo> {
        let user = self.auth().login(identifier, password).await?;
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Forget the logged-in user.
    pub async fn logout(&self) {
        let previous = self.user.write().await.take();
        if let Some(user) = previous {
            info!(user_id = %user.id, "Logged out");
        }
    }

    /// Id of the logged-in user, or `AuthRequired`.
    pub async fn require_user(&self) -> Result<UserInfo> {
        self.current_user().await.ok_or(ClientError::AuthRequired)
    }

    /// Authentication endpoints.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient::new(&self.http, &self.base_url)
    }

    /// Collection endpoints (banner, playlists, liked songs).
    pub fn playlists(&self) -> PlaylistClient<'_> {
        PlaylistClient::new(&self.http, &self.base_url)
    }
}
