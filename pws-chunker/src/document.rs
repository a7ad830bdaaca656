//! Data types for source documents, chunks and their classification tags.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ChunkError;

/// Metadata attached to documents and chunks.
///
/// Ordered so that serialised output is identical across runs.
pub type Metadata = BTreeMap<String, Value>;

/// A raw document handed to the pipeline by a loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceDocument {
    /// File name (or other identifier) of the document.
    pub file_name: String,
    /// Full text of the document.
    pub content: String,
    /// Caller-supplied metadata overlaid on the enriched metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Where the document was read from, if it came from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl SourceDocument {
    /// Create a document with no base metadata.
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            metadata: Metadata::new(),
            source_path: None,
        }
    }

    /// Add a base metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Record the path the document was loaded from.
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

/// Classification of a source document. Selects the splitting strategy and
/// the metadata template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Lecture,
    Textbook,
    Syllabus,
    Framework,
    Tool,
    Example,
    Reference,
    PriorArt,
    General,
}

impl DocType {
    /// Every document type, in declaration order.
    pub const ALL: [DocType; 9] = [
        DocType::Lecture,
        DocType::Textbook,
        DocType::Syllabus,
        DocType::Framework,
        DocType::Tool,
        DocType::Example,
        DocType::Reference,
        DocType::PriorArt,
        DocType::General,
    ];

    /// The wire tag of this document type.
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Lecture => "lecture",
            DocType::Textbook => "textbook",
            DocType::Syllabus => "syllabus",
            DocType::Framework => "framework",
            DocType::Tool => "tool",
            DocType::Example => "example",
            DocType::Reference => "reference",
            DocType::PriorArt => "prior_art",
            DocType::General => "general",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChunkError::Config(format!("unknown document type '{s}'")))
    }
}

/// The kind of natural breakpoint a chunk was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Slide,
    Section,
    Week,
    Paragraph,
}

impl ChunkType {
    /// The wire tag of this chunk type.
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::Slide => "slide",
            ChunkType::Section => "section",
            ChunkType::Week => "week",
            ChunkType::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded, overlapping, metadata-tagged span of a source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// SHA-256 of `content`, hex encoded.
    pub id: String,
    /// The chunk text, overlap prefix included.
    pub content: String,
    /// Number of whitespace-delimited words in `content`.
    pub word_count: usize,
    /// Exact or estimated token count of `content`.
    pub token_count: usize,
    /// File name of the parent document.
    pub source_file: String,
    /// Zero-based position within the parent document.
    pub chunk_index: usize,
    /// Number of chunks derived from the parent document.
    pub total_chunks: usize,
    /// `true` when the chunk starts with words copied from its predecessor.
    pub has_overlap: bool,
    /// Number of leading words copied from the previous chunk.
    pub overlap_word_count: usize,
    pub doc_type: DocType,
    pub chunk_type: ChunkType,
    /// Document-level enrichment plus chunk-local fields.
    pub metadata: Metadata,
}

/// Derive the deterministic identifier for a chunk's text.
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Count whitespace-delimited words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
