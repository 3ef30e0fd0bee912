//! IBM watsonx.ai provider implementations
//!
//! - `ibm/slate-125m-english-rtrvr` (default) for embeddings
//! - `ibm/granite-3-8b-instruct` (default) for answer generation
//!
//! Both share one HTTP client and one IAM token cache.

mod auth;
mod embedder;
mod llm;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::config::QaConfig;
use crate::error::{Error, Result};

pub use auth::IamAuth;
pub use embedder::WatsonxEmbedder;
pub use llm::WatsonxLlm;

/// Authenticated access to one watsonx.ai project
pub struct WatsonxClient {
    http: reqwest::Client,
    auth: IamAuth,
    base_url: String,
    api_version: String,
    project_id: String,
}

impl WatsonxClient {
    /// Create a client from configuration
    pub fn new(config: &QaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pdf-qa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        let auth = IamAuth::new(
            http.clone(),
            config.watsonx.iam_url.clone(),
            config.watsonx.api_key.clone(),
        );

        Ok(Self {
            http,
            auth,
            base_url: config.watsonx.url.trim_end_matches('/').to_string(),
            api_version: config.watsonx.api_version.clone(),
            project_id: config.watsonx.project_id.clone(),
        })
    }

    /// Project the requests are billed to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Check that credentials can be exchanged for a token
    pub async fn health_check(&self) -> Result<bool> {
        self.auth.get_token().await.map(|_| true)
    }

    /// POST a JSON body to `path` and decode the JSON response
    async fn post_json<B, R>(&self, service: &str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let token = self.auth.get_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .query(&[("version", self.api_version.as_str())])
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::remote(service, format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(service, format!("status {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::remote(service, format!("malformed response: {}", e)))
    }
}

/// Build the embedder and LLM over one shared client
pub fn from_config(config: &QaConfig) -> Result<(WatsonxEmbedder, WatsonxLlm)> {
    let client = Arc::new(WatsonxClient::new(config)?);
    Ok((
        WatsonxEmbedder::new(Arc::clone(&client), &config.embeddings),
        WatsonxLlm::new(client, &config.generation),
    ))
}
