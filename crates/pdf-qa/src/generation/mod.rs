//! Prompt rendering for answer generation

pub mod prompt;

pub use prompt::PromptBuilder;
