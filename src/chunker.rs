//! Bounded-size text chunking with word-boundary splits and trailing overlap.
//!
//! Articles are split into chunks of at most [`ChunkerConfig::chunk_size`]
//! characters, and consecutive chunks share roughly
//! [`ChunkerConfig::overlap`] characters of trailing context so a concept
//! spanning a chunk boundary stays retrievable from at least one chunk.
//! Splits always land on word boundaries unless a single word exceeds the
//! whole budget, in which case the word itself is divided.
//!
//! Chunks come out whitespace-normalized: internal newlines are collapsed to
//! single spaces and the ends are trimmed, so each chunk works as a
//! standalone context block. No content is dropped: stitching the chunks
//! back together (minus the overlap) reproduces the original word sequence.

use serde::{Deserialize, Serialize};

use crate::types::DigestError;

/// Chunking parameters, measured in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Upper bound on a chunk's length.
    pub chunk_size: usize,
    /// Approximate shared context between consecutive chunks.
    /// Must be strictly smaller than `chunk_size`.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

impl ChunkerConfig {
    fn validate(&self) -> Result<(), DigestError> {
        if self.chunk_size == 0 {
            return Err(DigestError::Config(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(DigestError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits article text into overlapping, bounded-size chunks.
#[derive(Clone, Debug)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

impl Chunker {
    /// Create a chunker, validating the configuration.
    pub fn new(config: ChunkerConfig) -> Result<Self, DigestError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into chunks.
    ///
    /// Empty or whitespace-only input yields an empty vector, not an error.
    pub fn split(&self, text: &str) -> Vec<String> {
        let ChunkerConfig {
            chunk_size,
            overlap,
        } = self.config;

        // Whitespace splitting collapses newlines and trims in one pass.
        // Words longer than the whole budget are divided mid-word; everything
        // else stays intact. Lengths are cached in characters.
        let mut units: Vec<(String, usize)> = Vec::new();
        for word in text.split_whitespace() {
            let len = word.chars().count();
            if len <= chunk_size {
                units.push((word.to_string(), len));
            } else {
                let chars: Vec<char> = word.chars().collect();
                for piece in chars.chunks(chunk_size) {
                    units.push((piece.iter().collect(), piece.len()));
                }
            }
        }
        if units.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        // Indices into `units`; the rendered length of `current` (words plus
        // single-space joiners) never exceeds `chunk_size`.
        let mut current: Vec<usize> = Vec::new();
        let mut current_len = 0usize;

        for idx in 0..units.len() {
            let unit_len = units[idx].1;
            if !current.is_empty() && current_len + 1 + unit_len > chunk_size {
                chunks.push(render(&units, &current));
                let (tail, tail_len) =
                    overlap_tail(&units, &current, overlap, chunk_size, unit_len);
                current = tail;
                current_len = tail_len;
            }
            current_len = if current.is_empty() {
                unit_len
            } else {
                current_len + 1 + unit_len
            };
            current.push(idx);
        }
        if !current.is_empty() {
            chunks.push(render(&units, &current));
        }
        chunks
    }
}

/// Trailing units of the just-emitted chunk that seed the next one.
///
/// The tail stays within `overlap` characters and always leaves room for the
/// unit that triggered the flush, so the next chunk cannot blow the budget.
fn overlap_tail(
    units: &[(String, usize)],
    current: &[usize],
    overlap: usize,
    chunk_size: usize,
    next_len: usize,
) -> (Vec<usize>, usize) {
    let mut tail: Vec<usize> = Vec::new();
    let mut tail_len = 0usize;
    for &idx in current.iter().rev() {
        let len = units[idx].1;
        let projected = if tail.is_empty() {
            len
        } else {
            tail_len + 1 + len
        };
        if projected > overlap || projected + 1 + next_len > chunk_size {
            break;
        }
        tail.push(idx);
        tail_len = projected;
    }
    tail.reverse();
    (tail, tail_len)
}

fn render(units: &[(String, usize)], indices: &[usize]) -> String {
    let mut out = String::new();
    for (i, &idx) in indices.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&units[idx].0);
    }
    out
}
