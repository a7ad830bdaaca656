//! Token counting.
//!
//! Exact counts come from a Hugging Face `tokenizer.json` when the crate is
//! built with the `tokenizers` feature. Without it, or when the tokenizer
//! cannot be loaded, counts are estimated from the word count. The active
//! mode is observable through [`TokenCounter::mode`].

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::document::count_words;
use crate::error::ChunkError;

/// Whether token counts are exact or estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCountMode {
    Exact,
    Estimated,
}

/// Counts tokens in chunk text.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;

    /// Which kind of count this counter produces.
    fn mode(&self) -> TokenCountMode;
}

/// Estimates tokens as `floor(words * tokens_per_word)`.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTokenCounter {
    tokens_per_word: f64,
}

impl EstimatedTokenCounter {
    pub fn new(tokens_per_word: f64) -> Self {
        Self { tokens_per_word }
    }
}

impl TokenCounter for EstimatedTokenCounter {
    fn count(&self, text: &str) -> usize {
        (count_words(text) as f64 * self.tokens_per_word).floor() as usize
    }

    fn mode(&self) -> TokenCountMode {
        TokenCountMode::Estimated
    }
}

/// Exact token counts from a Hugging Face tokenizer.
///
/// Texts the tokenizer fails to encode are estimated instead.
#[cfg(feature = "tokenizers")]
pub struct HfTokenCounter {
    tokenizer: tokenizers::Tokenizer,
    fallback: EstimatedTokenCounter,
}

#[cfg(feature = "tokenizers")]
impl HfTokenCounter {
    /// Load a tokenizer from a `tokenizer.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::TokenizerUnavailable`] if the file cannot be loaded.
    pub fn from_file(path: &Path, tokens_per_word: f64) -> crate::error::Result<Self> {
        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            ChunkError::TokenizerUnavailable(format!("cannot load '{}': {e}", path.display()))
        })?;
        Ok(Self { tokenizer, fallback: EstimatedTokenCounter::new(tokens_per_word) })
    }
}

#[cfg(feature = "tokenizers")]
impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(e) => {
                warn!(error = %e, "tokenizer failed to encode text, estimating");
                self.fallback.count(text)
            }
        }
    }

    fn mode(&self) -> TokenCountMode {
        TokenCountMode::Exact
    }
}

/// Build the best available counter for `tokenizer_path`.
///
/// Any failure to initialise the exact tokenizer is logged and the estimate
/// counter is returned instead; it is never retried.
pub fn token_counter_from_file(
    tokenizer_path: Option<&Path>,
    tokens_per_word: f64,
) -> Arc<dyn TokenCounter> {
    let estimate = || -> Arc<dyn TokenCounter> {
        Arc::new(EstimatedTokenCounter::new(tokens_per_word))
    };

    let Some(path) = tokenizer_path else {
        return estimate();
    };

    match load_exact(path, tokens_per_word) {
        Ok(counter) => {
            info!(path = %path.display(), "using exact token counts");
            counter
        }
        Err(e) => {
            warn!(error = %e, "falling back to estimated token counts");
            estimate()
        }
    }
}

#[cfg(feature = "tokenizers")]
fn load_exact(path: &Path, tokens_per_word: f64) -> crate::error::Result<Arc<dyn TokenCounter>> {
    Ok(Arc::new(HfTokenCounter::from_file(path, tokens_per_word)?))
}

#[cfg(not(feature = "tokenizers"))]
fn load_exact(path: &Path, _tokens_per_word: f64) -> crate::error::Result<Arc<dyn TokenCounter>> {
    Err(ChunkError::TokenizerUnavailable(format!(
        "built without the `tokenizers` feature, ignoring '{}'",
        path.display()
    )))
}
