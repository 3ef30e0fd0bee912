//! Prompt templates for RAG generation

use crate::retrieval::SearchResult;

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, nearest first, separated by blank lines
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| r.chunk.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the question-answering prompt
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            "Use the following context to answer the question.\n\n\
             Context:\n{context}\n\n\
             Question: {question}\n\n\
             Answer:",
            context = context,
            question = question
        )
    }
}
