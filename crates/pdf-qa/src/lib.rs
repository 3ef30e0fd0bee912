//! pdf-qa: ask questions about an uploaded PDF
//!
//! Each request loads the document, splits it into overlapping chunks, embeds
//! them with watsonx.ai, retrieves the chunks nearest the question and asks a
//! watsonx.ai model to answer from that context. A small web form fronts the
//! pipeline.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::QaConfig;
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{PipelineError, QaPipeline, Stage};
pub use report::ErrorReporter;
pub use types::{
    answer::{Answer, SourceRef},
    document::{Chunk, LoadedDocument, PageRecord},
};
