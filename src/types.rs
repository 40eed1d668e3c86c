//! Core domain types shared across the crate.
//!
//! This module defines the two concepts every other module speaks in terms of:
//! the [`Document`] being analyzed and the [`DigestError`] taxonomy. Chunk and
//! record types live next to the store that owns them
//! (see [`crate::stores`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// A fetched or uploaded article, immutable for the lifetime of a session.
///
/// `id` is a stable identifier: a normalized DOI for fetched papers, a file
/// name for uploads. Two documents with the same `id` are treated as the same
/// document by the session layer.
///
/// # Examples
///
/// ```rust
/// use paperdigest::Document;
///
/// let doc = Document::new("10.1101/2023.07.19.549542", "Example paper", "Full text here.");
/// assert_eq!(doc.word_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier (normalized DOI or file name).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Extracted article text.
    pub raw_text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Number of words in the article text, per Unicode word segmentation.
    ///
    /// Used by the session layer to decide between passing the full text
    /// downstream and indexing the document for retrieval.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.raw_text.unicode_words().count()
    }
}

/// Errors surfaced by the retrieval pipeline.
///
/// Only [`DimensionMismatch`](Self::DimensionMismatch) is fatal for an ingest
/// call; acquisition and per-document embedding failures are converted to
/// skip-and-continue semantics by the session layer and reported per document.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Invalid configuration (e.g. chunk overlap not smaller than chunk size).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The embedding gateway failed or returned an inconsistent batch.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A vector's width does not match the width the store already holds.
    ///
    /// Rejected outright: silently truncating or padding would corrupt every
    /// similarity comparison against the affected record.
    #[error("embedding dimension mismatch: store holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A document source could not build a usable request.
    #[error("document source error: {0}")]
    Source(String),

    /// Transport-level HTTP failure while talking to a document source.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_uses_unicode_words() {
        let doc = Document::new("d1", "t", "alpha beta-gamma, delta.");
        // "beta-gamma" segments into two words; punctuation is not counted.
        assert_eq!(doc.word_count(), 4);
    }

    #[test]
    fn word_count_empty_text() {
        let doc = Document::new("d1", "t", "");
        assert_eq!(doc.word_count(), 0);
    }

    #[test]
    fn dimension_mismatch_message_names_both_widths() {
        let err = DigestError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("384"));
        assert!(rendered.contains("768"));
    }
}
