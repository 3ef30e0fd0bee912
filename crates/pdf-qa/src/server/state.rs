//! Application state for the web form

use std::sync::Arc;

use crate::pipeline::QaPipeline;
use crate::report::ErrorReporter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Answers one question per request
    pipeline: QaPipeline,
    /// Console reports for failures outside the pipeline
    reporter: ErrorReporter,
    /// Request body limit in bytes
    max_upload_size: usize,
}

impl AppState {
    /// Wrap a pipeline for sharing across handlers
    pub fn new(pipeline: QaPipeline, max_upload_size: usize) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pipeline,
                reporter: ErrorReporter::new(),
                max_upload_size,
            }),
        }
    }

    /// Get the QA pipeline
    pub fn pipeline(&self) -> &QaPipeline {
        &self.inner.pipeline
    }

    /// Get the error reporter
    pub fn reporter(&self) -> &ErrorReporter {
        &self.inner.reporter
    }

    /// Request body limit in bytes
    pub fn max_upload_size(&self) -> usize {
        self.inner.max_upload_size
    }
}
