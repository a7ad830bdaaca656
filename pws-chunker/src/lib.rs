//! Structure-aware chunking for the PWS innovation curriculum.
//!
//! This crate provides:
//! - Document-type classification from file names and paths
//! - Breakpoint-aware splitting (slides, sections, weeks, paragraphs) into
//!   bounded, overlapping chunks
//! - Metadata enrichment from an injected curriculum table plus keyword,
//!   taxonomy and prior-art extraction
//! - Exact or estimated token counts
//! - Corpus loading, flat JSON export and corpus statistics
//!
//! # Example
//!
//! ```rust,ignore
//! use pws_chunker::{Chunker, ChunkingPipeline, SourceDocument};
//!
//! let pipeline = ChunkingPipeline::builder().build()?;
//! let chunks = pipeline.chunk(&SourceDocument::new("N02_UnDefined_Problems.txt", text));
//! for chunk in &chunks {
//!     println!("{} [{}] {} words", chunk.source_file, chunk.chunk_index, chunk.word_count);
//! }
//! ```

pub mod breakpoints;
mod chunking;
pub mod classify;
pub mod config;
pub mod curriculum;
pub mod document;
pub mod enrich;
pub mod error;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod tokens;

pub use breakpoints::SplitStrategy;
pub use classify::{classify, classify_path};
pub use config::{ChunkerConfig, ChunkerConfigBuilder};
pub use curriculum::{Curriculum, CurriculumEntry, Taxonomy, TopicCluster};
pub use document::{Chunk, ChunkType, DocType, Metadata, SourceDocument, content_id, count_words};
pub use enrich::{DocumentMetadata, MetadataEnricher, extract_keywords};
pub use error::{ChunkError, Result};
pub use export::{ChunkRecord, CorpusStats, flatten_metadata, write_json};
pub use loader::{discover_documents, load_corpus, load_document};
pub use pipeline::{Chunker, ChunkingPipeline, ChunkingPipelineBuilder};
#[cfg(feature = "tokenizers")]
pub use tokens::HfTokenCounter;
pub use tokens::{EstimatedTokenCounter, TokenCountMode, TokenCounter, token_counter_from_file};
