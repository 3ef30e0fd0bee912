//! Answer types returned by the pipeline

use serde::{Deserialize, Serialize};

/// A retrieved chunk that was passed to the model as context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Chunk index in document order
    pub chunk_index: u32,
    /// Source page number
    pub page_number: u32,
    /// Cosine similarity to the question (higher is closer)
    pub similarity: f32,
    /// Chunk text
    pub snippet: String,
}

/// Generated answer plus the evidence behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated text
    pub text: String,
    /// Retrieved context, nearest first
    pub sources: Vec<SourceRef>,
    /// Number of chunks indexed for this request
    pub chunks_indexed: usize,
    /// Wall-clock time for the whole pipeline
    pub processing_time_ms: u64,
}

impl Answer {
    /// Distinct source pages in retrieval order
    pub fn cited_pages(&self) -> Vec<u32> {
        let mut pages = Vec::new();
        for source in &self.sources {
            if !pages.contains(&source.page_number) {
                pages.push(source.page_number);
            }
        }
        pages
    }
}
