//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::config::GenerationConfig;
use crate::error::Result;

/// Per-call generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Maximum tokens to generate
    pub max_new_tokens: u32,
    /// Sampling temperature (0 selects greedy decoding)
    pub temperature: f32,
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait for prompt completion
///
/// Implementations:
/// - `WatsonxLlm`: IBM watsonx.ai (ibm/granite-3-8b-instruct)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a fully rendered prompt
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
