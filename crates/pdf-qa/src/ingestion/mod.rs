//! Document ingestion: PDF text extraction and chunking

mod chunker;
mod loader;

pub use chunker::{ChunkStrategy, TextChunker};
pub use loader::{cleanup_pdf_text, DocumentLoader};
