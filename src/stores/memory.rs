//! In-memory vector store with linear-scan cosine search.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ChunkRecord, RecordMetadata, VectorStore};
use crate::embeddings::EmbeddingProvider;
use crate::types::DigestError;

/// Guards against division by zero when a vector has zero norm.
const NORM_EPSILON: f32 = 1e-10;

#[derive(Default)]
struct Inner {
    records: Vec<ChunkRecord>,
    /// Maps `(document_id, sequence_index)` to a position in `records`.
    index: HashMap<(String, usize), usize>,
    /// Vector width, pinned by the first ingested record.
    dimension: Option<usize>,
}

/// Append/upsert-only in-memory store.
///
/// Embedding runs before the write lock is taken, and a document's records
/// are inserted under a single lock acquisition, so a concurrent `search`
/// sees either none or all of a document's chunks, never a partial batch.
/// Ingests of the same `(document_id, sequence_index)` key serialize on the
/// lock; the last writer wins, which is exactly upsert semantics.
#[derive(Default)]
pub struct MemoryVectorStore {
    inner: RwLock<Inner>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vector width currently enforced, or `None` while the store is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.inner.read().dimension
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn ingest(
        &self,
        document_id: &str,
        title: &str,
        chunks: &[String],
        provider: &dyn EmbeddingProvider,
    ) -> Result<usize, DigestError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let vectors = provider.embed_batch(chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(DigestError::Embedding(format!(
                "provider '{}' returned {} vectors for {} chunks",
                provider.name(),
                vectors.len(),
                chunks.len()
            )));
        }
        let batch_width = vectors[0].len();
        for vector in &vectors {
            if vector.len() != batch_width {
                return Err(DigestError::DimensionMismatch {
                    expected: batch_width,
                    actual: vector.len(),
                });
            }
        }

        let mut inner = self.inner.write();
        if let Some(expected) = inner.dimension {
            if batch_width != expected {
                return Err(DigestError::DimensionMismatch {
                    expected,
                    actual: batch_width,
                });
            }
        } else {
            inner.dimension = Some(batch_width);
        }

        for (sequence_index, (text, vector)) in chunks.iter().zip(vectors).enumerate() {
            let record = ChunkRecord {
                text: text.clone(),
                vector,
                metadata: RecordMetadata {
                    document_id: document_id.to_string(),
                    title: title.to_string(),
                    sequence_index,
                },
            };
            let key = (document_id.to_string(), sequence_index);
            let existing = inner.index.get(&key).copied();
            match existing {
                Some(position) => inner.records[position] = record,
                None => {
                    let position = inner.records.len();
                    inner.records.push(record);
                    inner.index.insert(key, position);
                }
            }
        }
        let total = inner.records.len();
        drop(inner);

        tracing::debug!(
            document_id,
            written = chunks.len(),
            total,
            "ingested document chunks"
        );
        Ok(chunks.len())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<String>, DigestError> {
        let inner = self.inner.read();
        if inner.records.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = inner.dimension {
            if query.len() != expected {
                return Err(DigestError::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(f32, &ChunkRecord)> = inner
            .records
            .iter()
            .map(|record| (cosine_similarity(query, &record.vector), record))
            .collect();
        // Highest similarity first; equal scores fall back to document order
        // so repeated queries against an unchanged store are reproducible.
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| document_order(&a.1.metadata, &b.1.metadata))
        });
        scored.truncate(top_k.min(inner.records.len()));

        // Return the winners in document order, not similarity order: the
        // joined context should read as ordered passages, title by title.
        scored.sort_by(|a, b| document_order(&a.1.metadata, &b.1.metadata));

        let texts: Vec<String> = scored
            .iter()
            .map(|(_, record)| record.text.clone())
            .collect();
        tracing::debug!(requested = top_k, returned = texts.len(), "similarity search");
        Ok(texts)
    }

    async fn count(&self) -> usize {
        self.inner.read().records.len()
    }

    async fn reset(&self) {
        let mut inner = self.inner.write();
        *inner = Inner::default();
    }
}

/// `(title, sequence_index)` ascending, with `document_id` as the final
/// disambiguator for documents that share a title.
fn document_order(a: &RecordMetadata, b: &RecordMetadata) -> std::cmp::Ordering {
    (&a.title, a.sequence_index, &a.document_id).cmp(&(
        &b.title,
        b.sequence_index,
        &b.document_id,
    ))
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt() + NORM_EPSILON)
}
