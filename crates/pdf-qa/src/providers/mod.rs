//! Provider abstractions for embeddings and LLM generation
//!
//! The pipeline only sees the traits; `watsonx` holds the hosted implementations.

pub mod embedding;
pub mod llm;
pub mod watsonx;

pub use embedding::EmbeddingProvider;
pub use llm::{GenerationParams, LlmProvider};
