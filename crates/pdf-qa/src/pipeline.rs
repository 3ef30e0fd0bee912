//! Question answering over one uploaded PDF
//!
//! One request walks the stages in order and never revisits one:
//!
//! `Idle → Validating → Loading → Chunking → Embedding → Indexing → Retrieving → Generating → Done`
//!
//! Any stage can fail. The failure is reported to the console and returned as a
//! [`PipelineError`] naming the stage. Every request builds its own index from
//! the uploaded file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::QaConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::{DocumentLoader, TextChunker};
use crate::providers::{EmbeddingProvider, GenerationParams, LlmProvider};
use crate::report::ErrorReporter;
use crate::retrieval::VectorIndex;
use crate::types::{Answer, SourceRef};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Validating,
    Loading,
    Chunking,
    Embedding,
    Indexing,
    Retrieving,
    Generating,
    Done,
    Failed,
}

impl Stage {
    /// Human-readable stage name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating input",
            Self::Loading => "loading document",
            Self::Chunking => "chunking text",
            Self::Embedding => "embedding chunks",
            Self::Indexing => "indexing vectors",
            Self::Retrieving => "retrieving context",
            Self::Generating => "generating answer",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failed request: the stage that was running and what went wrong
#[derive(Debug, thiserror::Error)]
#[error("QA pipeline failed while {stage}: {error}")]
pub struct PipelineError {
    /// Stage active when the error occurred
    pub stage: Stage,
    /// The underlying error
    #[source]
    pub error: Error,
}

impl PipelineError {
    /// Taxonomy bucket of the underlying error
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Text shown to the user in place of an answer
    pub fn user_message(&self) -> String {
        format!("{} while {}: {}", self.kind(), self.stage, self.error)
    }
}

/// Load → chunk → embed → index → retrieve → generate
pub struct QaPipeline {
    loader: DocumentLoader,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    params: GenerationParams,
    top_k: usize,
    reporter: ErrorReporter,
}

impl QaPipeline {
    /// Create a pipeline from configuration and remote collaborators
    pub fn new(
        config: &QaConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        if config.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be positive"));
        }
        Ok(Self {
            loader: DocumentLoader::new(),
            chunker: config.chunking.build_chunker()?,
            embedder,
            llm,
            params: GenerationParams::from(&config.generation),
            top_k: config.retrieval.top_k,
            reporter: ErrorReporter::new(),
        })
    }

    /// Replace the console reporter
    pub fn with_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Answer `question` from the PDF at `file`
    pub async fn answer(
        &self,
        file: &Path,
        question: &str,
    ) -> std::result::Result<Answer, PipelineError> {
        let start = Instant::now();
        let mut stage = Stage::Idle;

        match self.run(file, question, &mut stage).await {
            Ok(mut answer) => {
                answer.processing_time_ms = start.elapsed().as_millis() as u64;
                tracing::info!(
                    "Answered in {}ms from {} chunks ({} retrieved)",
                    answer.processing_time_ms,
                    answer.chunks_indexed,
                    answer.sources.len()
                );
                Ok(answer)
            }
            Err(error) => {
                tracing::error!("Pipeline failed while {}: {}", stage, error);
                tracing::debug!("stage: {} -> {}", stage, Stage::Failed);
                self.reporter.report(
                    &error,
                    Some(&format!("QA pipeline failed while {}", stage)),
                );
                Err(PipelineError { stage, error })
            }
        }
    }

    async fn run(&self, file: &Path, question: &str, stage: &mut Stage) -> Result<Answer> {
        advance(stage, Stage::Validating);
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("question must not be empty"));
        }
        tracing::info!("Running QA pipeline for query: {}", question);

        advance(stage, Stage::Loading);
        let document = self.load(file.to_path_buf()).await?;

        advance(stage, Stage::Chunking);
        let chunks = self.chunker.chunk_pages(&document.pages);
        if chunks.is_empty() {
            return Err(Error::load(file.display().to_string(), "document produced no chunks"));
        }
        tracing::info!(
            "Split {} into {} chunks ({} method, size {}, overlap {})",
            document.filename,
            chunks.len(),
            self.chunker.strategy(),
            self.chunker.chunk_size(),
            self.chunker.overlap()
        );

        advance(stage, Stage::Embedding);
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(Error::remote(
                self.embedder.name(),
                format!("expected {} embeddings, got {}", chunks.len(), vectors.len()),
            ));
        }

        advance(stage, Stage::Indexing);
        let chunks_indexed = chunks.len();
        let mut index = VectorIndex::with_capacity(chunks_indexed);
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            index.insert(chunk, vector)?;
        }
        index.seal();
        tracing::debug!(
            "Indexed {} vectors of dimension {:?}",
            index.len(),
            index.dimensions()
        );

        advance(stage, Stage::Retrieving);
        let query_vector = self.embedder.embed(question).await?;
        let results = index.query(&query_vector, self.top_k)?;
        for result in &results {
            tracing::debug!(
                "Retrieved chunk {} (page {}, similarity {:.3})",
                result.chunk.index,
                result.chunk.page_number,
                result.similarity
            );
        }

        advance(stage, Stage::Generating);
        let context = PromptBuilder::build_context(&results);
        let prompt = PromptBuilder::build_qa_prompt(question, &context);
        let text = self.llm.generate(&prompt, &self.params).await?;
        if text.trim().is_empty() {
            return Err(Error::remote(self.llm.name(), "model returned an empty answer"));
        }

        advance(stage, Stage::Done);
        Ok(Answer {
            text,
            sources: results
                .into_iter()
                .map(|r| SourceRef {
                    chunk_index: r.chunk.index,
                    page_number: r.chunk.page_number,
                    similarity: r.similarity,
                    snippet: r.chunk.content,
                })
                .collect(),
            chunks_indexed,
            processing_time_ms: 0,
        })
    }

    /// PDF parsing is CPU-bound, keep it off the async workers
    async fn load(&self, path: PathBuf) -> Result<crate::types::LoadedDocument> {
        let loader = self.loader;
        tokio::task::spawn_blocking(move || loader.load(&path))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::debug!("stage: {} -> {}", stage, next);
    *stage = next;
}
