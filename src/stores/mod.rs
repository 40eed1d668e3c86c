//! Storage for embedded article chunks.
//!
//! The [`VectorStore`] trait abstracts over chunk storage so the session layer
//! never depends on a specific engine.
//!
//! ```text
//!                   ┌──────────────────┐
//!                   │ VectorStore trait│
//!                   │  (async CRUD)    │
//!                   └────────┬─────────┘
//!                            │
//!              ┌─────────────┼─────────────┐
//!              ▼             ▼             ▼
//!       ┌────────────┐ ┌────────────┐ ┌────────────┐
//!       │  In-memory │ │  (future)  │ │  (future)  │
//!       │ linear scan│ │ sqlite-vec │ │  pgvector  │
//!       └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! Corpora here are small (tens to low hundreds of chunks per session), so
//! the shipped backend is a deliberate linear scan over an in-memory record
//! list. If corpus sizes grow, an indexed backend slots in behind the same
//! trait without touching callers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use paperdigest::stores::VectorStore;
//!
//! async fn index<S: VectorStore>(store: &S) -> Result<(), paperdigest::DigestError> {
//!     let added = store
//!         .ingest("10.1101/x", "Some paper", &chunks, provider.as_ref())
//!         .await?;
//!     println!("stored {added} records");
//!     Ok(())
//! }
//! ```

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embeddings::EmbeddingProvider;
use crate::types::DigestError;

pub use memory::MemoryVectorStore;

/// Identifying metadata carried by every stored record.
///
/// `(document_id, sequence_index)` is the record's unique key: re-ingesting a
/// document overwrites its records instead of duplicating them. `title` and
/// `sequence_index` also drive the deterministic ordering of search results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Identifier of the parent document.
    pub document_id: String,
    /// Title of the parent document.
    pub title: String,
    /// Position of the chunk within its parent document.
    pub sequence_index: usize,
}

/// A stored chunk: its text, its embedding, and where it came from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// The chunk text, exactly as produced by the chunker.
    pub text: String,
    /// The chunk's embedding. All vectors in one store share one dimension.
    pub vector: Vec<f32>,
    /// Provenance and ordering metadata.
    pub metadata: RecordMetadata,
}

/// Contract for chunk storage backends.
///
/// `count` and `reset` are infallible: an empty or freshly reset store is a
/// normal state, never an error.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed `chunks` (batched through `provider`) and store one record per
    /// chunk, with `sequence_index` equal to the chunk's position.
    ///
    /// Returns the number of records written. An empty `chunks` slice is a
    /// no-op returning `Ok(0)`. Vectors whose width differs from what the
    /// store already holds are rejected with
    /// [`DigestError::DimensionMismatch`], never truncated or padded.
    async fn ingest(
        &self,
        document_id: &str,
        title: &str,
        chunks: &[String],
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize, DigestError>;

    /// Return the texts of the `top_k` records most similar to `query` by
    /// cosine similarity.
    ///
    /// Similarity ties are broken by `(title, sequence_index)` ascending, and
    /// the selected texts come back in that same order (document order, not
    /// similarity order) so the joined context reads as coherent passages.
    /// `top_k` is clamped to the record count; an empty store yields an empty
    /// vector.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<String>, DigestError>;

    /// Number of stored records.
    async fn count(&self) -> usize;

    /// Discard all records, returning the store to its initial empty state.
    async fn reset(&self);
}
