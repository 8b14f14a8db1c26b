use super::error::{RemoteError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Supplies a bearer access token per request. Implementations must return
/// a currently valid token or fail the call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, for tests and short-lived tooling.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn needs_refresh(&self) -> bool {
        // Refresh if the token expires within 5 minutes
        Utc::now() >= self.expires_at - Duration::minutes(5)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 refresh-token exchanger with a cached access token.
///
/// The interactive consent flow that produces the refresh token is outside
/// this crate; see [`OauthTokenProvider::consent_url`] for the URL a user
/// must visit to obtain one.
pub struct OauthTokenProvider {
    client: reqwest::Client,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    state: RwLock<Option<CachedToken>>,
}

impl OauthTokenProvider {
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            state: RwLock::new(None),
        }
    }

    /// Build the consent URL a user visits to grant offline access; the
    /// resulting authorization code is exchanged for the refresh token out
    /// of band.
    pub fn consent_url(auth_endpoint: &str, client_id: &str, redirect_uri: &str, scope: &str) -> String {
        let query = serde_urlencoded::to_string([
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", scope),
            ("access_type", "offline"),
        ])
        .unwrap_or_default();
        format!("{}?{}", auth_endpoint, query)
    }

    async fn refresh(&self) -> Result<CachedToken> {
        debug!("Refreshing remote access token");

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Authentication(message));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for OauthTokenProvider {
    async fn access_token(&self) -> Result<String> {
        {
            let state = self.state.read().await;
            if let Some(cached) = state.as_ref() {
                if !cached.needs_refresh() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let refreshed = self.refresh().await?;
        let token = refreshed.token.clone();
        *self.state.write().await = Some(refreshed);
        Ok(token)
    }
}
