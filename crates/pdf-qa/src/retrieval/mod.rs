//! Vector retrieval over one document's chunks

pub mod vector_store;

pub use vector_store::{SearchResult, VectorIndex};
