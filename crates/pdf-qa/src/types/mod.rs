//! Core types for the QA pipeline

pub mod answer;
pub mod document;

pub use answer::{Answer, SourceRef};
pub use document::{Chunk, LoadedDocument, PageRecord};
