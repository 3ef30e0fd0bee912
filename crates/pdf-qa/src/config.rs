//! Configuration for the QA service
//!
//! Built once at startup from defaults, an optional TOML file and the
//! environment, then handed to every component that needs it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ingestion::{ChunkStrategy, TextChunker};

/// Environment variable holding the watsonx.ai API key
pub const ENV_API_KEY: &str = "APIKEY";
/// Environment variable holding the watsonx.ai project id
pub const ENV_PROJECT_ID: &str = "PROJECT_ID";
/// Environment variable overriding the watsonx.ai endpoint
pub const ENV_URL: &str = "WATSONX_URL";
/// Dotenv file read at startup when present
pub const DEFAULT_DOTENV_PATH: &str = "env/.env";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaConfig {
    /// Web form server
    #[serde(default)]
    pub server: ServerConfig,
    /// watsonx.ai endpoint and credentials
    #[serde(default)]
    pub watsonx: WatsonxConfig,
    /// Embedding model parameters
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Generation model parameters
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Text chunking
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl QaConfig {
    /// Load configuration: defaults or `path`, then the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_optional_file(path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Like [`QaConfig::load`], with variables from the dotenv file at `dotenv`
    /// filling in whatever the process environment leaves unset
    pub fn load_with_dotenv(path: Option<&Path>, dotenv: &Path) -> Result<Self> {
        let file_vars = read_dotenv(dotenv)?;
        if !file_vars.is_empty() {
            tracing::info!("Read {} variables from {}", file_vars.len(), dotenv.display());
        }

        let mut config = Self::from_optional_file(path)?;
        config.apply_env_from(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        });
        config.validate()?;
        Ok(config)
    }

    fn from_optional_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Invalid config file: {}", e)))
    }

    /// Overlay credentials and endpoint from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay credentials and endpoint from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.watsonx.api_key = key;
        }
        if let Some(project) = lookup(ENV_PROJECT_ID) {
            self.watsonx.project_id = project;
        }
        if let Some(url) = lookup(ENV_URL).filter(|u| !u.trim().is_empty()) {
            self.watsonx.url = url;
        }
    }

    /// Check that the configuration can serve requests
    pub fn validate(&self) -> Result<()> {
        if self.watsonx.api_key.trim().is_empty() {
            return Err(Error::config(format!(
                "{} environment variable is not set. Please check your environment.",
                ENV_API_KEY
            )));
        }
        if self.watsonx.project_id.trim().is_empty() {
            return Err(Error::config(format!(
                "{} environment variable is not set. Please check your environment.",
                ENV_PROJECT_ID
            )));
        }
        if self.watsonx.url.trim().is_empty() {
            return Err(Error::config("watsonx url must not be empty"));
        }

        // Surfaces bad strategy tags and overlap >= chunk size at startup
        self.chunking.build_chunker()?;

        if self.embeddings.batch_size == 0 {
            return Err(Error::config("embeddings.batch_size must be positive"));
        }
        if self.generation.max_new_tokens == 0 {
            return Err(Error::config("generation.max_new_tokens must be positive"));
        }
        if !(self.generation.temperature >= 0.0 && self.generation.temperature.is_finite()) {
            return Err(Error::config(format!(
                "generation.temperature must be a finite non-negative number, got {}",
                self.generation.temperature
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be positive"));
        }
        Ok(())
    }
}

/// Variables defined in a dotenv file; a missing file defines none
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    iter.map(|item| {
        item.map_err(|e| Error::config(format!("Invalid entry in {}: {}", path.display(), e)))
    })
    .collect()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

impl ServerConfig {
    /// `host:port` string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// watsonx.ai endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatsonxConfig {
    /// Regional watsonx.ai endpoint
    pub url: String,
    /// IBM Cloud IAM token endpoint
    pub iam_url: String,
    /// API version query parameter
    pub api_version: String,
    /// API key (read from `APIKEY`, never written back out)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Project id (read from `PROJECT_ID`)
    pub project_id: String,
}

impl Default for WatsonxConfig {
    fn default() -> Self {
        Self {
            url: "https://us-south.ml.cloud.ibm.com".to_string(),
            iam_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
            api_version: "2024-05-01".to_string(),
            api_key: String::new(),
            project_id: String::new(),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model id
    pub model: String,
    /// Inputs longer than this many tokens are truncated by the service
    pub truncate_input_tokens: u32,
    /// Ask the service to echo the input text back
    pub return_input_text: bool,
    /// Maximum inputs per embeddings request
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "ibm/slate-125m-english-rtrvr".to_string(),
            truncate_input_tokens: 3,
            return_input_text: true,
            batch_size: 1000,
        }
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Generation model id
    pub model: String,
    /// Maximum tokens to generate
    pub max_new_tokens: u32,
    /// Sampling temperature (0 selects greedy decoding)
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "ibm/granite-3-8b-instruct".to_string(),
            max_new_tokens: 512,
            temperature: 0.5,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Strategy tag: `recursive` or `fixed-width`
    pub strategy: String,
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Recursive.as_str().to_string(),
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

impl ChunkingConfig {
    /// Build a chunker, rejecting unknown strategies and bad size/overlap pairs
    pub fn build_chunker(&self) -> Result<TextChunker> {
        let strategy: ChunkStrategy = self.strategy.parse()?;
        TextChunker::new(strategy, self.chunk_size, self.chunk_overlap)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks passed to the model as context
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}
