//! watsonx.ai embedding provider

use async_trait::async_trait;
use std::sync::Arc;

use super::WatsonxClient;
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;

const SERVICE: &str = "watsonx embeddings";
const PATH: &str = "/ml/v1/text/embeddings";

/// watsonx.ai embedding provider
pub struct WatsonxEmbedder {
    client: Arc<WatsonxClient>,
    model: String,
    truncate_input_tokens: u32,
    return_input_text: bool,
    batch_size: usize,
}

impl WatsonxEmbedder {
    /// Create an embedder over a shared client
    pub fn new(client: Arc<WatsonxClient>, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            truncate_input_tokens: config.truncate_input_tokens,
            return_input_text: config.return_input_text,
            batch_size: config.batch_size.max(1),
        }
    }

    async fn embed_request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model_id: &self.model,
            project_id: self.client.project_id(),
            inputs,
            parameters: EmbedParameters {
                truncate_input_tokens: self.truncate_input_tokens,
                return_options: ReturnOptions {
                    input_text: self.return_input_text,
                },
            },
        };

        let response: EmbedResponse = self.client.post_json(SERVICE, PATH, &request).await?;

        if response.results.len() != inputs.len() {
            return Err(Error::remote(
                SERVICE,
                format!(
                    "expected {} embeddings, got {}",
                    inputs.len(),
                    response.results.len()
                ),
            ));
        }

        response
            .results
            .into_iter()
            .map(|r| {
                if r.embedding.is_empty() {
                    Err(Error::remote(SERVICE, "empty embedding in response"))
                } else {
                    Ok(r.embedding)
                }
            })
            .collect()
    }
}

#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    inputs: &'a [String],
    parameters: EmbedParameters,
}

#[derive(serde::Serialize)]
struct EmbedParameters {
    truncate_input_tokens: u32,
    return_options: ReturnOptions,
}

#[derive(serde::Serialize)]
struct ReturnOptions {
    input_text: bool,
}

#[derive(serde::Deserialize)]
struct EmbedResponse {
    results: Vec<EmbedResult>,
}

#[derive(serde::Deserialize)]
struct EmbedResult {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for WatsonxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let inputs = [text.to_string()];
        self.embed_request(&inputs)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::remote(SERVICE, "no embedding in response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding batch of {} texts with {}", batch.len(), self.model);
            all_embeddings.extend(self.embed_request(batch).await?);
        }
        Ok(all_embeddings)
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "watsonx"
    }
}
