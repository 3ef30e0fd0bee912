//! IBM Cloud IAM authentication
//!
//! Exchanges the API key for a bearer token and caches it until shortly
//! before it expires.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

const IAM_SERVICE: &str = "IBM Cloud IAM";
const API_KEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed once they have less than this left
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// IAM token manager
pub struct IamAuth {
    http: reqwest::Client,
    iam_url: String,
    api_key: String,
    /// Cached access token
    token: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: u64,
}

impl IamAuth {
    /// Create a token manager for `api_key` against the IAM endpoint `iam_url`
    pub fn new(http: reqwest::Client, iam_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            iam_url: iam_url.into(),
            api_key: api_key.into(),
            token: RwLock::new(None),
        }
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn get_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                if cached.expires_at > Instant::now() + REFRESH_MARGIN {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut token = self.token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(ref cached) = *token {
            if cached.expires_at > Instant::now() + REFRESH_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *token = Some(fresh);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken> {
        tracing::debug!("Requesting IAM access token from {}", self.iam_url);

        let response = self
            .http
            .post(&self.iam_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", API_KEY_GRANT), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::remote(IAM_SERVICE, format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(
                IAM_SERVICE,
                format!("token exchange failed ({}): {}", status, body),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(IAM_SERVICE, format!("malformed token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }
}
