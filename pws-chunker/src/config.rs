//! Configuration for the chunking pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};

/// Size and enrichment parameters shared by every splitting strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Preferred number of words per chunk.
    pub target_words: usize,
    /// Number of words carried from the tail of one chunk into the next.
    pub overlap_words: usize,
    /// Smallest chunk emitted anywhere except at the end of a document.
    pub min_words: usize,
    /// Hard upper bound as a multiple of `target_words`.
    pub max_ratio: f64,
    /// Documents whose trimmed text is shorter than this are skipped.
    pub min_content_chars: usize,
    /// Tokens-per-word ratio used when no exact tokenizer is available.
    pub tokens_per_word: f64,
    /// Maximum number of keywords extracted from content.
    pub max_keywords: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            target_words: 1000,
            overlap_words: 200,
            min_words: 500,
            max_ratio: 1.2,
            min_content_chars: 100,
            tokens_per_word: 1.3,
            max_keywords: 15,
        }
    }
}

impl ChunkerConfig {
    /// Create a new builder for constructing a [`ChunkerConfig`].
    pub fn builder() -> ChunkerConfigBuilder {
        ChunkerConfigBuilder::default()
    }

    /// Hard upper bound on the number of words in a chunk, overlap included.
    pub fn max_words(&self) -> usize {
        // Nudge past float error so 1000 * 1.2 is 1200, not 1199.
        let max = (self.target_words as f64 * self.max_ratio + 1e-9).floor() as usize;
        max.max(self.target_words)
    }

    /// Check that the parameters are consistent with each other.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Config`] if:
    /// - `target_words == 0`
    /// - `min_words == 0` or `min_words > target_words`
    /// - `overlap_words >= min_words`
    /// - `max_ratio < 1.0`
    /// - `tokens_per_word <= 0.0`
    pub fn validate(&self) -> Result<()> {
        if self.target_words == 0 {
            return Err(ChunkError::Config("target_words must be greater than zero".to_string()));
        }
        if self.min_words == 0 || self.min_words > self.target_words {
            return Err(ChunkError::Config(format!(
                "min_words ({}) must be between 1 and target_words ({})",
                self.min_words, self.target_words
            )));
        }
        if self.overlap_words >= self.min_words {
            return Err(ChunkError::Config(format!(
                "overlap_words ({}) must be less than min_words ({})",
                self.overlap_words, self.min_words
            )));
        }
        if self.max_ratio.is_nan() || self.max_ratio < 1.0 {
            return Err(ChunkError::Config(format!(
                "max_ratio ({}) must be at least 1.0",
                self.max_ratio
            )));
        }
        if self.tokens_per_word.is_nan() || self.tokens_per_word <= 0.0 {
            return Err(ChunkError::Config("tokens_per_word must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`ChunkerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ChunkerConfigBuilder {
    config: ChunkerConfig,
}

impl ChunkerConfigBuilder {
    /// Set the preferred number of words per chunk.
    pub fn target_words(mut self, words: usize) -> Self {
        self.config.target_words = words;
        self
    }

    /// Set the number of overlapping words between consecutive chunks.
    pub fn overlap_words(mut self, words: usize) -> Self {
        self.config.overlap_words = words;
        self
    }

    /// Set the minimum size of a non-final chunk.
    pub fn min_words(mut self, words: usize) -> Self {
        self.config.min_words = words;
        self
    }

    /// Set the hard upper bound as a multiple of the target size.
    pub fn max_ratio(mut self, ratio: f64) -> Self {
        self.config.max_ratio = ratio;
        self
    }

    /// Set the minimum trimmed length (in characters) of an indexable document.
    pub fn min_content_chars(mut self, chars: usize) -> Self {
        self.config.min_content_chars = chars;
        self
    }

    /// Set the tokens-per-word ratio used for estimated token counts.
    pub fn tokens_per_word(mut self, ratio: f64) -> Self {
        self.config.tokens_per_word = ratio;
        self
    }

    /// Set the maximum number of keywords extracted from content.
    pub fn max_keywords(mut self, count: usize) -> Self {
        self.config.max_keywords = count;
        self
    }

    /// Build the [`ChunkerConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Config`] under the conditions listed on
    /// [`ChunkerConfig::validate`].
    pub fn build(self) -> Result<ChunkerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
