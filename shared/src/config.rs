//! Configuration for the smart home skill, loaded from the Lambda environment.

use std::env;
use std::time::Duration;

/// Skill configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Gooee cloud API.
    pub api_url: String,
    /// OAuth2 token endpoint used for refresh-token exchanges.
    pub token_url: String,
    /// OAuth2 client credentials issued by Gooee.
    pub client_id: String,
    pub client_secret: String,
    /// Long-lived refresh token minted during account linking. Absence is
    /// surfaced as an auth failure on first use, not at startup.
    pub refresh_token: Option<String>,
    /// Per-request timeout for vendor calls. The Lambda deadline bounds the
    /// whole invocation, so this must stay well under it.
    pub vendor_timeout: Duration,
}

const DEFAULT_API_URL: &str = "https://api.gooee.io";
const DEFAULT_VENDOR_TIMEOUT_SECS: u64 = 8;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        let api_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let token_url =
            env::var("OAUTH_TOKEN_URL").unwrap_or_else(|_| format!("{}/oauth/token", api_url));

        Ok(Self {
            api_url,
            token_url,
            client_id: env::var("GOOEE_CLIENT_ID")?,
            client_secret: env::var("GOOEE_CLIENT_SECRET")?,
            refresh_token: env::var("GOOEE_REFRESH_TOKEN").ok(),
            vendor_timeout: Duration::from_secs(
                env::var("VENDOR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_VENDOR_TIMEOUT_SECS),
            ),
        })
    }
}
