//! Page and chunk types with source tracking

use serde::{Deserialize, Serialize};

/// Text extracted from a single PDF page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Extracted, cleaned text
    pub text: String,
}

impl PageRecord {
    /// Create a page record
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A loaded document: ordered pages from one file
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Source filename, for logs and reports
    pub filename: String,
    /// Pages in document order
    pub pages: Vec<PageRecord>,
    /// Page count reported by the PDF, including pages without text
    pub total_pages: u32,
}

impl LoadedDocument {
    /// Total characters of text across pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// A bounded span of page text; the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in document order, consecutive across pages
    pub index: u32,
    /// Source page number (1-indexed)
    pub page_number: u32,
    /// Chunk text, an exact slice of the page text
    pub content: String,
    /// Start offset within the page, in characters
    pub char_start: usize,
    /// End offset within the page, in characters (exclusive)
    pub char_end: usize,
}
