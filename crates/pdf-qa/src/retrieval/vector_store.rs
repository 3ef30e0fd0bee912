//! In-memory cosine-similarity index
//!
//! Filled once per request, sealed, then queried. Brute force is fine at the
//! scale of a single uploaded document.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (-1.0 to 1.0, higher is more similar)
    pub similarity: f32,
}

struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
    norm: f32,
}

/// Vector index for one document
#[derive(Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: Option<usize>,
    sealed: bool,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with room for `capacity` chunks
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Add one chunk with its embedding
    ///
    /// The first vector fixes the dimensionality of the index.
    pub fn insert(&mut self, chunk: Chunk, vector: Vec<f32>) -> Result<()> {
        if self.sealed {
            return Err(Error::index("cannot insert into a sealed index"));
        }
        if vector.is_empty() {
            return Err(Error::index(format!("chunk {} has an empty embedding", chunk.index)));
        }
        match self.dimensions {
            Some(dims) if dims != vector.len() => {
                return Err(Error::index(format!(
                    "dimension mismatch for chunk {}: expected {}, got {}",
                    chunk.index,
                    dims,
                    vector.len()
                )));
            }
            Some(_) => {}
            None => self.dimensions = Some(vector.len()),
        }

        let norm = l2_norm(&vector);
        self.entries.push(IndexEntry { chunk, vector, norm });
        Ok(())
    }

    /// Close the index for writes; queries are only allowed afterwards
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether `seal` has been called
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality, once known
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// The `k` chunks nearest to `query`, most similar first
    ///
    /// Ties keep insertion order.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if !self.sealed {
            return Err(Error::index("index queried before all chunks were inserted"));
        }
        if let Some(dims) = self.dimensions {
            if dims != query.len() {
                return Err(Error::index(format!(
                    "query dimension mismatch: expected {}, got {}",
                    dims,
                    query.len()
                )));
            }
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, query_norm, &e.vector, e.norm)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, similarity)| SearchResult {
                chunk: self.entries[i].chunk.clone(),
                similarity,
            })
            .collect())
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_similarity(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}
