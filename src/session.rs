//! Session orchestration: strategy selection, indexing, and context assembly.
//!
//! A [`RetrievalSession`] owns the vector store, the embedding provider, and
//! the active document set for one question-answering session. It decides,
//! per document set, whether questions are answered against the full article
//! text (a single document small enough to pass downstream inline) or
//! against retrieved chunks (several documents, or one oversized document).
//!
//! The session object replaces ambient UI state with an explicit lifecycle:
//! build it, `prepare` it with documents, call `answer_context` per question,
//! drop it (or re-`prepare`) when the document set changes.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::chunker::{Chunker, ChunkerConfig};
use crate::embeddings::EmbeddingProvider;
use crate::stores::{MemoryVectorStore, VectorStore};
use crate::types::{DigestError, Document};

/// Tunables for a retrieval session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Chunking parameters used when a document set is indexed.
    pub chunker: ChunkerConfig,
    /// A lone document at or under this word count is passed downstream in
    /// full instead of being indexed.
    pub max_inline_words: usize,
    /// Fraction of the stored record count retrieved per question.
    pub top_k_fraction: f64,
    /// Hard ceiling on retrieved chunks, capping worst-case context length.
    pub top_k_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            max_inline_words: 20_000,
            top_k_fraction: 0.2,
            top_k_cap: 15,
        }
    }
}

/// How the current document set is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// No documents loaded.
    Empty,
    /// One small document; questions see its full text.
    Inline,
    /// Chunked, embedded, and stored; questions see retrieved chunks.
    Indexed,
}

/// Outcome of preparing a document set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalPlan {
    /// Strategy chosen for this document set.
    pub strategy: RetrievalStrategy,
    /// Documents in the prepared set.
    pub documents: usize,
    /// Records written to the store (zero for inline and empty sets).
    pub records: usize,
    /// Documents skipped because chunking or embedding failed. A partial
    /// corpus beats an entirely failed session; callers decide whether to
    /// warn the user.
    pub failed_documents: BTreeSet<String>,
}

enum SessionState {
    Empty,
    Inline { document: Document },
    Indexed,
}

/// Owns one session's retrieval pipeline.
///
/// # Examples
///
/// ```rust,ignore
/// use paperdigest::{Document, MockEmbeddingProvider, RetrievalSession};
/// use std::sync::Arc;
///
/// let mut session = RetrievalSession::builder()
///     .with_embedding_provider(Arc::new(MockEmbeddingProvider::new()))
///     .build()?;
///
/// let plan = session.prepare(documents).await?;
/// let context = session.answer_context("What was the key finding?").await?;
/// ```
pub struct RetrievalSession {
    id: Uuid,
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
    chunker: Chunker,
    config: SessionConfig,
    state: SessionState,
    prepared: Option<(BTreeSet<String>, RetrievalPlan)>,
}

impl RetrievalSession {
    /// Start building a session.
    pub fn builder() -> RetrievalSessionBuilder {
        RetrievalSessionBuilder::default()
    }

    /// Unique identifier for this session, carried in log fields.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Strategy currently in effect.
    pub fn strategy(&self) -> RetrievalStrategy {
        match self.state {
            SessionState::Empty => RetrievalStrategy::Empty,
            SessionState::Inline { .. } => RetrievalStrategy::Inline,
            SessionState::Indexed => RetrievalStrategy::Indexed,
        }
    }

    /// The session's vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Load a document set, choosing and executing the retrieval strategy.
    ///
    /// Re-preparing with the same document-id set is an idempotent no-op that
    /// returns the previous plan without re-embedding anything. Any other set
    /// resets the store first, so records from an earlier corpus never leak
    /// into the new one.
    ///
    /// Documents whose chunking or embedding fails are skipped and reported
    /// in [`RetrievalPlan::failed_documents`]. A store dimension mismatch is
    /// a session-level invariant violation and is returned as an error.
    pub async fn prepare(
        &mut self,
        mut documents: Vec<Document>,
    ) -> Result<RetrievalPlan, DigestError> {
        let ids: BTreeSet<String> = documents.iter().map(|d| d.id.clone()).collect();
        if let Some((prepared_ids, plan)) = &self.prepared {
            if *prepared_ids == ids {
                tracing::debug!(
                    session = %self.id,
                    documents = documents.len(),
                    "document set unchanged; keeping existing plan"
                );
                return Ok(plan.clone());
            }
        }

        self.store.reset().await;
        self.state = SessionState::Empty;
        self.prepared = None;

        let plan = if documents.is_empty() {
            RetrievalPlan {
                strategy: RetrievalStrategy::Empty,
                documents: 0,
                records: 0,
                failed_documents: BTreeSet::new(),
            }
        } else if documents.len() == 1
            && documents[0].word_count() <= self.config.max_inline_words
        {
            let document = documents.swap_remove(0);
            tracing::info!(
                session = %self.id,
                document_id = %document.id,
                words = document.word_count(),
                "serving single document inline"
            );
            let plan = RetrievalPlan {
                strategy: RetrievalStrategy::Inline,
                documents: 1,
                records: 0,
                failed_documents: BTreeSet::new(),
            };
            self.state = SessionState::Inline { document };
            plan
        } else {
            let total = documents.len();

            // Documents embed and ingest concurrently; each document's chunks
            // land in the store as one atomic batch, so parallelism here never
            // exposes a partially ingested document to a search.
            let mut tasks: JoinSet<Result<usize, (String, DigestError)>> = JoinSet::new();
            for document in documents {
                let store = Arc::clone(&self.store);
                let provider = Arc::clone(&self.provider);
                let chunker = self.chunker.clone();
                tasks.spawn(async move {
                    let chunks = chunker.split(&document.raw_text);
                    if chunks.is_empty() {
                        tracing::warn!(
                            document_id = %document.id,
                            "document produced no chunks"
                        );
                        return Ok(0);
                    }
                    store
                        .ingest(&document.id, &document.title, &chunks, provider.as_ref())
                        .await
                        .map_err(|err| (document.id, err))
                });
            }

            let mut records = 0usize;
            let mut failed_documents = BTreeSet::new();
            let mut fatal = None;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Ok(written)) => records += written,
                    Ok(Err((_, err @ DigestError::DimensionMismatch { .. }))) => {
                        fatal = Some(err);
                    }
                    Ok(Err((document_id, err))) => {
                        tracing::warn!(
                            session = %self.id,
                            document_id = %document_id,
                            error = %err,
                            "skipping document"
                        );
                        failed_documents.insert(document_id);
                    }
                    Err(join_err) => {
                        fatal = Some(DigestError::Embedding(format!(
                            "ingest task failed: {join_err}"
                        )));
                    }
                }
            }
            if let Some(err) = fatal {
                // Store invariant violation: abort rather than leave a corpus
                // that mixes vector widths.
                self.store.reset().await;
                return Err(err);
            }

            tracing::info!(
                session = %self.id,
                documents = total,
                records,
                failed = failed_documents.len(),
                "indexed document set"
            );
            self.state = SessionState::Indexed;
            RetrievalPlan {
                strategy: RetrievalStrategy::Indexed,
                documents: total,
                records,
                failed_documents,
            }
        };

        self.prepared = Some((ids, plan.clone()));
        Ok(plan)
    }

    /// Assemble the context string for a question.
    ///
    /// Inline sessions return the full article text verbatim. Indexed
    /// sessions embed the question, retrieve the top chunks, and join them
    /// with newlines. An empty or chunk-less corpus yields an empty string;
    /// the downstream answer generator owns the "nothing to cite" message.
    pub async fn answer_context(&self, query: &str) -> Result<String, DigestError> {
        match &self.state {
            SessionState::Empty => Ok(String::new()),
            SessionState::Inline { document } => Ok(document.raw_text.clone()),
            SessionState::Indexed => {
                let total = self.store.count().await;
                if total == 0 {
                    return Ok(String::new());
                }
                let top_k = self.top_k_for(total);
                let query_vector = self.provider.embed(query).await?;
                let texts = self.store.search(&query_vector, top_k).await?;
                Ok(texts.join("\n"))
            }
        }
    }

    /// Retrieval depth proportional to corpus size, clamped to `1..=cap`.
    fn top_k_for(&self, total: usize) -> usize {
        let scaled = (total as f64 * self.config.top_k_fraction).round() as usize;
        scaled.clamp(1, self.config.top_k_cap)
    }
}

/// Builder for [`RetrievalSession`].
#[derive(Default)]
pub struct RetrievalSessionBuilder {
    store: Option<Arc<dyn VectorStore>>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    config: Option<SessionConfig>,
}

impl RetrievalSessionBuilder {
    /// Set the embedding provider. Required.
    #[must_use]
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a specific store instead of a fresh in-memory one.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the session, validating the configuration.
    pub fn build(self) -> Result<RetrievalSession, DigestError> {
        let provider = self
            .provider
            .ok_or_else(|| DigestError::Config("an embedding provider is required".into()))?;
        let config = self.config.unwrap_or_default();
        let chunker = Chunker::new(config.chunker)?;
        Ok(RetrievalSession {
            id: Uuid::new_v4(),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryVectorStore::new())),
            provider,
            chunker,
            config,
            state: SessionState::Empty,
            prepared: None,
        })
    }
}
