//! Text chunking with page and position tracking
//!
//! Both strategies produce spans that cover the page text without gaps, with
//! consecutive spans sharing exactly `overlap` characters. Offsets are in
//! characters (Unicode scalar values), never bytes.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::types::{Chunk, PageRecord};

/// How chunk ends are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Prefer paragraph, line, sentence, then word boundaries before a raw cut
    Recursive,
    /// Raw character cuts every `chunk_size - overlap` characters
    FixedWidth,
}

impl ChunkStrategy {
    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::FixedWidth => "fixed-width",
        }
    }
}

impl fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "fixed-width" | "fixed_width" | "character" => Ok(Self::FixedWidth),
            other => Err(Error::config(format!(
                "Invalid split method '{}'. Choose \"recursive\" or \"fixed-width\".",
                other
            ))),
        }
    }
}

/// Text chunker with configurable size and overlap
#[derive(Debug, Clone)]
pub struct TextChunker {
    strategy: ChunkStrategy,
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters shared by consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// Fails with a config error when `chunk_size` is zero or `overlap >= chunk_size`.
    pub fn new(strategy: ChunkStrategy, chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk size must be positive"));
        }
        if overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            strategy,
            chunk_size,
            overlap,
        })
    }

    /// Strategy in use
    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every page, numbering chunks consecutively in document order
    pub fn chunk_pages(&self, pages: &[PageRecord]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut index = 0u32;

        for page in pages {
            let chars: Vec<char> = page.text.chars().collect();
            for span in self.spans(&page.text) {
                chunks.push(Chunk {
                    index,
                    page_number: page.page_number,
                    content: chars[span.clone()].iter().collect(),
                    char_start: span.start,
                    char_end: span.end,
                });
                index += 1;
            }
        }

        tracing::debug!(
            "Chunked {} pages into {} chunks ({}, size {}, overlap {})",
            pages.len(),
            chunks.len(),
            self.strategy,
            self.chunk_size,
            self.overlap
        );

        chunks
    }

    /// Character ranges of the chunks of `text`
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        if len == 0 {
            return Vec::new();
        }

        let boundaries = match self.strategy {
            ChunkStrategy::Recursive => Some(Boundaries::scan(text, &chars)),
            ChunkStrategy::FixedWidth => None,
        };

        let mut spans = Vec::new();
        let mut start = 0usize;
        loop {
            if len - start <= self.chunk_size {
                spans.push(start..len);
                break;
            }

            let window_end = start + self.chunk_size;
            // Any end must leave the chunk longer than the overlap so the next start advances
            let end = boundaries
                .as_ref()
                .and_then(|b| b.best_end(start + self.overlap, window_end))
                .unwrap_or(window_end);

            spans.push(start..end);
            start = end - self.overlap;
        }

        spans
    }
}

/// Candidate chunk ends for the recursive strategy, one sorted list per level
struct Boundaries {
    levels: [Vec<usize>; 4],
}

impl Boundaries {
    fn scan(text: &str, chars: &[char]) -> Self {
        let mut paragraphs = Vec::new();
        let mut lines = Vec::new();
        let mut words = Vec::new();

        for (i, c) in chars.iter().enumerate() {
            let end = i + 1;
            if *c == '\n' {
                lines.push(end);
                if i > 0 && chars[i - 1] == '\n' {
                    paragraphs.push(end);
                }
            }
            if c.is_whitespace() {
                words.push(end);
            }
        }

        let mut sentences = Vec::new();
        let mut pos = 0usize;
        for sentence in text.split_sentence_bounds() {
            pos += sentence.chars().count();
            sentences.push(pos);
        }

        Self {
            levels: [paragraphs, lines, sentences, words],
        }
    }

    /// Largest end in `(floor, ceil]` at the coarsest level that has one
    fn best_end(&self, floor: usize, ceil: usize) -> Option<usize> {
        self.levels.iter().find_map(|ends| {
            let idx = ends.partition_point(|&e| e <= ceil);
            (idx > 0 && ends[idx - 1] > floor).then(|| ends[idx - 1])
        })
    }
}
