//! Access-token management for the Gooee OAuth2 token endpoint.
//!
//! The provider owns the access/refresh token pair; handlers only ever see
//! the opaque access token they need for a single vendor call.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::AuthError;

/// Leeway subtracted from expiry so an in-flight vendor call never races the
/// token's actual expiration.
const EXPIRY_SKEW_SECS: i64 = 60;

/// A cached access token and its expiry.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Valid while `now < expires_at - skew`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_SKEW_SECS)
    }
}

/// Source of vendor access tokens. Implemented by [`OauthTokenProvider`] for
/// the real token endpoint and by fakes in tests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token, refreshing if needed.
    async fn access_token(&self) -> Result<String, AuthError>;

    /// Performs one refresh exchange, replacing the cached token only on
    /// success; a failed exchange leaves the cache as it was.
    async fn refresh(&self) -> Result<String, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Refresh-token exchange against the vendor's OAuth2 endpoint.
pub struct OauthTokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: Mutex<Option<String>>,
    cached: Mutex<Option<Token>>,
}

impl OauthTokenProvider {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: Mutex::new(config.refresh_token.clone()),
            cached: Mutex::new(None),
        }
    }

    /// Seed the cache, e.g. with a token restored from a warm start.
    pub fn with_cached_token(self, token: Token) -> Self {
        Self {
            cached: Mutex::new(Some(token)),
            ..self
        }
    }

    /// Performs the refresh exchange. Called with the cache lock held so one
    /// invocation never issues two concurrent refreshes; the cache is only
    /// replaced on success, leaving the stale token in place on failure.
    async fn refresh_locked(&self, cached: &mut Option<Token>) -> Result<String, AuthError> {
        let refresh_token = {
            let guard = self.refresh_token.lock().await;
            guard.clone().ok_or(AuthError::MissingRefreshToken)?
        };

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "token refresh rejected");
            return Err(AuthError::RefreshRejected(format!("{}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(format!("undecodable token response: {}", e)))?;

        // Vendors may rotate the refresh token on each exchange.
        if let Some(rotated) = token.refresh_token {
            let mut guard = self.refresh_token.lock().await;
            *guard = Some(rotated);
        }

        let fresh = Token {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        };
        info!(expires_at = %fresh.expires_at, "access token refreshed");
        let access = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access)
    }
}

#[async_trait]
impl TokenProvider for OauthTokenProvider {
    async fn access_token(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_valid_at(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }
        self.refresh_locked(&mut cached).await
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;
        self.refresh_locked(&mut cached).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(refresh_token: Option<&str>) -> OauthTokenProvider {
        let config = Config {
            api_url: "https://api.gooee.io".to_string(),
            token_url: "https://api.gooee.io/oauth/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: refresh_token.map(String::from),
            vendor_timeout: std::time::Duration::from_secs(8),
        };
        OauthTokenProvider::new(&config, reqwest::Client::new())
    }

    #[test]
    fn token_validity_respects_skew() {
        let now = Utc::now();
        let token = Token {
            access_token: "abc".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_SKEW_SECS + 1),
        };
        assert!(token.is_valid_at(now));

        let expiring = Token {
            access_token: "abc".to_string(),
            expires_at: now + Duration::seconds(EXPIRY_SKEW_SECS),
        };
        assert!(!expiring.is_valid_at(now));
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_network() {
        let err = provider(None).access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));
    }

    #[tokio::test]
    async fn cached_valid_token_is_returned_as_is() {
        let provider = provider(None).with_cached_token(Token {
            access_token: "cached".to_string(),
            expires_at: Utc::now() + Duration::seconds(3600),
        });
        // No refresh token is configured, so any refresh attempt would fail;
        // a cache hit is the only way this succeeds.
        assert_eq!(provider.access_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn failed_refresh_leaves_cached_token_untouched() {
        let provider = provider(None).with_cached_token(Token {
            access_token: "stale".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        });

        let err = provider.refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));

        // The stale token stays in place for diagnostics.
        let cached = provider.cached.lock().await;
        assert_eq!(cached.as_ref().unwrap().access_token, "stale");
    }

    #[tokio::test]
    async fn expired_cache_is_not_reused() {
        let provider = provider(None).with_cached_token(Token {
            access_token: "stale".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        });
        let err = provider.access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRefreshToken));
    }
}
