//! Output records, JSON export and corpus statistics.
//!
//! Search backends frequently accept only scalar metadata values, so the
//! default export flattens each chunk into a [`ChunkRecord`]: list values are
//! joined with commas and nested objects are JSON-encoded strings.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::document::{Chunk, ChunkType, DocType, Metadata};
use crate::error::Result;
use crate::tokens::TokenCountMode;

const TOP_FRAMEWORKS: usize = 10;

/// A chunk with every metadata value reduced to a scalar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    pub id: String,
    pub content: String,
    pub word_count: usize,
    pub token_count: usize,
    pub source_file: String,
    /// Same value as `chunk_index`, kept for consumers that key on position.
    pub source_position: usize,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub has_overlap: bool,
    pub doc_type: DocType,
    pub chunk_type: ChunkType,
    pub metadata: Metadata,
}

impl From<&Chunk> for ChunkRecord {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.clone(),
            content: chunk.content.clone(),
            word_count: chunk.word_count,
            token_count: chunk.token_count,
            source_file: chunk.source_file.clone(),
            source_position: chunk.chunk_index,
            chunk_index: chunk.chunk_index,
            total_chunks: chunk.total_chunks,
            has_overlap: chunk.has_overlap,
            doc_type: chunk.doc_type,
            chunk_type: chunk.chunk_type,
            metadata: flatten_metadata(&chunk.metadata),
        }
    }
}

/// Reduce every value in `metadata` to a string, number, boolean or null.
pub fn flatten_metadata(metadata: &Metadata) -> Metadata {
    metadata.iter().map(|(key, value)| (key.clone(), flatten_value(value))).collect()
}

fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::String(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Value::String(value.to_string()),
        scalar => scalar.clone(),
    }
}

/// Write `chunks` to `path` as a pretty-printed JSON array.
///
/// With `flatten` the records are [`ChunkRecord`]s; otherwise chunks keep
/// their structured metadata. Missing parent directories are created.
pub fn write_json(path: impl AsRef<Path>, chunks: &[Chunk], flatten: bool) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    if flatten {
        let records: Vec<ChunkRecord> = chunks.iter().map(ChunkRecord::from).collect();
        serde_json::to_writer_pretty(&mut writer, &records)?;
    } else {
        serde_json::to_writer_pretty(&mut writer, chunks)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(path = %path.display(), chunk_count = chunks.len(), flatten, "wrote chunks");
    Ok(())
}

/// Summary of a chunked corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusStats {
    pub documents: usize,
    pub chunks: usize,
    pub total_words: usize,
    pub total_tokens: usize,
    pub avg_words: f64,
    pub avg_tokens: f64,
    pub by_doc_type: BTreeMap<String, usize>,
    pub by_chunk_type: BTreeMap<String, usize>,
    /// Most frequently mentioned frameworks, by number of chunks.
    pub top_frameworks: Vec<(String, usize)>,
    pub token_count_mode: TokenCountMode,
}

impl CorpusStats {
    pub fn from_chunks(chunks: &[Chunk], token_count_mode: TokenCountMode) -> Self {
        let mut documents = HashSet::new();
        let mut by_doc_type = BTreeMap::new();
        let mut by_chunk_type = BTreeMap::new();
        let mut frameworks: HashMap<&str, usize> = HashMap::new();
        let mut total_words = 0;
        let mut total_tokens = 0;

        for chunk in chunks {
            documents.insert(chunk.source_file.as_str());
            *by_doc_type.entry(chunk.doc_type.to_string()).or_insert(0) += 1;
            *by_chunk_type.entry(chunk.chunk_type.to_string()).or_insert(0) += 1;
            total_words += chunk.word_count;
            total_tokens += chunk.token_count;

            if let Some(Value::Array(names)) = chunk.metadata.get("related_frameworks") {
                for name in names.iter().filter_map(Value::as_str) {
                    *frameworks.entry(name).or_insert(0) += 1;
                }
            }
        }

        let mut top_frameworks: Vec<(String, usize)> =
            frameworks.into_iter().map(|(name, count)| (name.to_string(), count)).collect();
        top_frameworks.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_frameworks.truncate(TOP_FRAMEWORKS);

        let average = |total: usize| {
            if chunks.is_empty() { 0.0 } else { total as f64 / chunks.len() as f64 }
        };

        Self {
            documents: documents.len(),
            chunks: chunks.len(),
            total_words,
            total_tokens,
            avg_words: average(total_words),
            avg_tokens: average(total_tokens),
            by_doc_type,
            by_chunk_type,
            top_frameworks,
            token_count_mode,
        }
    }
}
