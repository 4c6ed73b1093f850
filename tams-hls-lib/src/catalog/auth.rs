//! Bearer credentials for the TAMS store.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{ManifestError, Result};

/// Tokens are refreshed this long before their reported expiry.
const REFRESH_SLACK: Duration = Duration::from_secs(30);

const DEFAULT_EXPIRES_IN: u64 = 300;

/// Source of the bearer credential attached to catalog requests.
pub enum TokenProvider {
    /// No credential; requests go out unauthenticated.
    None,
    /// Fixed token from configuration.
    Static(String),
    /// OAuth2 client-credentials grant with expiry-aware caching.
    ClientCredentials(ClientCredentials),
}

impl TokenProvider {
    pub async fn bearer(&self) -> Result<Option<String>> {
        match self {
            TokenProvider::None => Ok(None),
            TokenProvider::Static(token) => Ok(Some(token.clone())),
            TokenProvider::ClientCredentials(grant) => grant.token().await.map(Some),
        }
    }
}

/// OAuth2 client-credentials flow against a token endpoint.
pub struct ClientCredentials {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    cached: RwLock<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn fresh(&self) -> bool {
        Instant::now() + REFRESH_SLACK < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN
}

impl ClientCredentials {
    pub fn new(
        http: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            scopes,
            cached: RwLock::new(None),
        }
    }

    /// Current access token, requesting a new one when the cached token is
    /// absent or about to expire.
    pub async fn token(&self) -> Result<String> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.fresh()) {
                return Ok(token.token.clone());
            }
        }

        let mut slot = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = slot.as_ref().filter(|t| t.fresh()) {
            return Ok(token.token.clone());
        }

        let scope = self.scopes.join(" ");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ManifestError::Auth(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ManifestError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ManifestError::Auth(e.to_string()))?;

        debug!(expires_in = body.expires_in, "refreshed catalog credential");
        *slot = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(body.expires_in),
        });
        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_configured_token() {
        let provider = TokenProvider::Static("abc".into());
        assert_eq!(provider.bearer().await.unwrap(), Some("abc".into()));
    }

    #[tokio::test]
    async fn none_provider_returns_no_token() {
        assert_eq!(TokenProvider::None.bearer().await.unwrap(), None);
    }

    #[test]
    fn token_response_defaults_expiry() {
        let body: TokenResponse = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(body.expires_in, DEFAULT_EXPIRES_IN);
    }
}
