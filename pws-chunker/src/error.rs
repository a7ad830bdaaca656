//! Error types for the `pws-chunker` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, chunking or exporting documents.
///
/// Only configuration, curriculum and output errors ever reach callers of the
/// pipeline. The document-level conditions are converted into documented
/// fallbacks (empty output, estimated token counts) at the pipeline boundary.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// The document's text could not be obtained (unsupported format, decode failure).
    #[error("Unreadable document ({path}): {message}")]
    UnreadableDocument {
        /// Path of the document that could not be read.
        path: PathBuf,
        /// A description of the failure.
        message: String,
    },

    /// The exact tokenizer could not be initialised.
    #[error("Tokenizer unavailable: {0}")]
    TokenizerUnavailable(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The curriculum table could not be parsed or is inconsistent.
    #[error("Curriculum error: {0}")]
    Curriculum(String),

    /// An I/O error while reading the corpus or writing output.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialisation error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A convenience result type for chunking operations.
pub type Result<T> = std::result::Result<T, ChunkError>;
