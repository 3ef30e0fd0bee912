//! watsonx.ai text generation provider

use async_trait::async_trait;
use std::sync::Arc;

use super::WatsonxClient;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::providers::llm::{GenerationParams, LlmProvider};

const SERVICE: &str = "watsonx generation";
const PATH: &str = "/ml/v1/text/generation";

/// watsonx.ai generation client
pub struct WatsonxLlm {
    client: Arc<WatsonxClient>,
    model: String,
}

impl WatsonxLlm {
    /// Create a generation client over a shared client
    pub fn new(client: Arc<WatsonxClient>, config: &GenerationConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
        }
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    input: &'a str,
    parameters: GenerateParameters,
}

#[derive(serde::Serialize)]
struct GenerateParameters {
    decoding_method: &'static str,
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl From<&GenerationParams> for GenerateParameters {
    fn from(params: &GenerationParams) -> Self {
        // Temperature only applies to sampling
        if params.temperature > 0.0 {
            Self {
                decoding_method: "sample",
                max_new_tokens: params.max_new_tokens,
                temperature: Some(params.temperature),
            }
        } else {
            Self {
                decoding_method: "greedy",
                max_new_tokens: params.max_new_tokens,
                temperature: None,
            }
        }
    }
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    results: Vec<GenerateResult>,
}

#[derive(serde::Deserialize)]
struct GenerateResult {
    generated_text: String,
}

#[async_trait]
impl LlmProvider for WatsonxLlm {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = GenerateRequest {
            model_id: &self.model,
            project_id: self.client.project_id(),
            input: prompt,
            parameters: GenerateParameters::from(params),
        };

        let response: GenerateResponse = self.client.post_json(SERVICE, PATH, &request).await?;

        response
            .results
            .into_iter()
            .next()
            .map(|r| r.generated_text.trim().to_string())
            .ok_or_else(|| Error::remote(SERVICE, "no generated text in response"))
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "watsonx"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
