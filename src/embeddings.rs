//! The embedding gateway capability and a deterministic mock.
//!
//! The store and session layers depend only on [`EmbeddingProvider`]; concrete
//! backends (remote APIs, local models) implement the trait as adapters. A
//! provider produces vectors of one fixed dimension for its whole lifetime;
//! the store enforces that invariant at ingest time.
//!
//! [`MockEmbeddingProvider`] ships in the crate proper (not behind
//! `cfg(test)`) so downstream integration tests and CI runs can exercise the
//! full pipeline without network access or model weights.

use async_trait::async_trait;

use crate::types::DigestError;

/// Converts text into fixed-width embedding vectors.
///
/// Implementations must be deterministic for a fixed underlying model and
/// must return vectors of a single dimension for the lifetime of the
/// instance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DigestError>;

    /// Embed a single text.
    ///
    /// The default implementation delegates to [`embed_batch`](Self::embed_batch).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DigestError> {
        let batch = [text.to_string()];
        let mut vectors = self.embed_batch(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| DigestError::Embedding("provider returned an empty batch".into()))
    }
}

/// Deterministic, dependency-free embedding provider for tests and demos.
///
/// Each word hashes to a fixed pseudo-random direction; a text embeds as the
/// normalized sum of its word directions. Texts sharing words therefore land
/// closer together, which is enough structure for retrieval tests to make
/// meaningful assertions.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbeddingProvider {
    /// Default 32-dimensional provider.
    pub fn new() -> Self {
        Self { dimension: 32 }
    }

    /// Provider with a custom output width.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Output vector width.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut acc = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let mut state = fnv1a(word.to_lowercase().as_bytes());
            for slot in acc.iter_mut() {
                state = xorshift(state);
                // Map to [-1, 1].
                *slot += (state >> 40) as f32 / ((1u64 << 23) as f32) - 1.0;
            }
        }
        let norm: f32 = acc.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for slot in acc.iter_mut() {
                *slot /= norm;
            }
        }
        acc
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DigestError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    // A zero state would make the generator stick.
    hash | 1
}

fn xorshift(mut state: u64) -> u64 {
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    state
}
