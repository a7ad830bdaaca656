//! Chunking pipeline orchestrator.
//!
//! The [`ChunkingPipeline`] runs every document through the same stages:
//! classify → split → enrich → count tokens. Construct one via
//! [`ChunkingPipeline::builder()`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pws_chunker::{ChunkingPipeline, ChunkerConfig, Chunker, Curriculum, SourceDocument};
//!
//! let pipeline = ChunkingPipeline::builder()
//!     .config(ChunkerConfig::default())
//!     .curriculum(Arc::new(Curriculum::builtin()))
//!     .build()?;
//!
//! let chunks = pipeline.chunk(&SourceDocument::new("N02_UnDefined.txt", text));
//! ```

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::breakpoints::SplitStrategy;
use crate::chunking::Splitter;
use crate::classify::{classify, classify_path};
use crate::config::ChunkerConfig;
use crate::curriculum::Curriculum;
use crate::document::{Chunk, DocType, SourceDocument, content_id};
use crate::enrich::MetadataEnricher;
use crate::error::Result;
use crate::tokens::{EstimatedTokenCounter, TokenCountMode, TokenCounter};

/// Turns source documents into chunks.
///
/// Implementations must be deterministic and must not fail: documents that
/// cannot be chunked produce an empty `Vec`.
pub trait Chunker: Send + Sync {
    /// Split a document into enriched chunks.
    fn chunk(&self, document: &SourceDocument) -> Vec<Chunk>;
}

/// The chunking and enrichment pipeline.
pub struct ChunkingPipeline {
    config: ChunkerConfig,
    splitter: Splitter,
    enricher: MetadataEnricher,
    token_counter: Arc<dyn TokenCounter>,
}

impl ChunkingPipeline {
    /// Create a new [`ChunkingPipelineBuilder`].
    pub fn builder() -> ChunkingPipelineBuilder {
        ChunkingPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Return the enricher, and through it the curriculum in use.
    pub fn enricher(&self) -> &MetadataEnricher {
        &self.enricher
    }

    /// Whether token counts are exact or estimated.
    pub fn token_count_mode(&self) -> TokenCountMode {
        self.token_counter.mode()
    }

    /// The document type a document is processed as.
    ///
    /// Documents loaded from disk are classified by their full path so that
    /// their directories can contribute; others by file name only.
    pub fn doc_type_of(&self, document: &SourceDocument) -> DocType {
        match &document.source_path {
            Some(path) => classify_path(path),
            None => classify(&document.file_name),
        }
    }

    /// Chunk documents one after another, concatenating results in input order.
    pub fn chunk_all(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        documents.iter().flat_map(|document| self.chunk(document)).collect()
    }

    /// Chunk documents on the blocking thread pool, one task per document.
    ///
    /// Results are returned in input order. A task that panics is logged and
    /// its document contributes no chunks.
    pub async fn chunk_concurrent(self: &Arc<Self>, documents: Vec<SourceDocument>) -> Vec<Chunk> {
        let document_count = documents.len();
        let mut tasks = JoinSet::new();
        for (index, document) in documents.into_iter().enumerate() {
            let pipeline = Arc::clone(self);
            tasks.spawn_blocking(move || (index, pipeline.chunk(&document)));
        }

        let mut results: Vec<Option<Vec<Chunk>>> = vec![None; document_count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, chunks)) => results[index] = Some(chunks),
                Err(e) => error!(error = %e, "chunking task failed"),
            }
        }

        let chunks: Vec<Chunk> = results.into_iter().flatten().flatten().collect();
        info!(document_count, chunk_count = chunks.len(), "chunked corpus");
        chunks
    }
}

impl Chunker for ChunkingPipeline {
    fn chunk(&self, document: &SourceDocument) -> Vec<Chunk> {
        let content_chars = document.content.trim().chars().count();
        if content_chars < self.config.min_content_chars {
            warn!(
                file = %document.file_name,
                content_chars,
                "skipping document with too little content"
            );
            return Vec::new();
        }

        let doc_type = self.doc_type_of(document);
        let strategy = SplitStrategy::for_doc_type(doc_type);
        let pieces = self.splitter.split(&document.content, strategy);

        let mut shared = self
            .enricher
            .enrich(&document.file_name, &document.content, doc_type)
            .to_metadata();
        shared.extend(document.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));

        let total_chunks = pieces.len();
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, piece)| {
                let mut metadata = shared.clone();
                metadata.extend(piece.local);
                Chunk {
                    id: content_id(&piece.content),
                    token_count: self.token_counter.count(&piece.content),
                    word_count: piece.word_count,
                    source_file: document.file_name.clone(),
                    chunk_index,
                    total_chunks,
                    has_overlap: piece.overlap_words > 0,
                    overlap_word_count: piece.overlap_words,
                    doc_type,
                    chunk_type: piece.chunk_type,
                    metadata,
                    content: piece.content,
                }
            })
            .collect();

        debug!(file = %document.file_name, ?strategy, "split document");
        info!(
            file = %document.file_name,
            %doc_type,
            chunk_count = total_chunks,
            "chunked document"
        );
        chunks
    }
}

/// Builder for constructing a [`ChunkingPipeline`].
///
/// Every field is optional: the default configuration, the built-in
/// curriculum and estimated token counts are used for anything not set.
#[derive(Default)]
pub struct ChunkingPipelineBuilder {
    config: Option<ChunkerConfig>,
    curriculum: Option<Arc<Curriculum>>,
    token_counter: Option<Arc<dyn TokenCounter>>,
}

impl ChunkingPipelineBuilder {
    /// Set the size and overlap configuration.
    pub fn config(mut self, config: ChunkerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the curriculum consulted by the enricher.
    pub fn curriculum(mut self, curriculum: Arc<Curriculum>) -> Self {
        self.curriculum = Some(curriculum);
        self
    }

    /// Set the token counter.
    pub fn token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.token_counter = Some(counter);
        self
    }

    /// Build the [`ChunkingPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Config`](crate::ChunkError::Config) if the
    /// configuration is invalid.
    pub fn build(self) -> Result<ChunkingPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let curriculum = self.curriculum.unwrap_or_else(|| Arc::new(Curriculum::builtin()));
        let token_counter = self
            .token_counter
            .unwrap_or_else(|| Arc::new(EstimatedTokenCounter::new(config.tokens_per_word)));

        Ok(ChunkingPipeline {
            splitter: Splitter::new(&config),
            enricher: MetadataEnricher::new(curriculum, config.max_keywords),
            token_counter,
            config,
        })
    }
}
