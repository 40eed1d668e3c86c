//! Retrieval core for question answering over scientific articles.
//!
//! ```text
//! DOI / upload ──► sources::DocumentSource ──► Document
//!
//! Documents ──► session::RetrievalSession::prepare
//!                   │
//!                   ├─ one small document ──► full text kept inline
//!                   │
//!                   └─ several documents, or one oversized ──► chunker::Chunker
//!                                                                    │
//!                                              embeddings::EmbeddingProvider
//!                                                                    │
//!                                                   stores::MemoryVectorStore
//!
//! question ──► answer_context ──► top-K cosine retrieval ──► context string
//!                                                                    │
//!                            answer::AnswerRequest ──► downstream generator
//! ```
//!
pub mod answer;
pub mod chunker;
pub mod embeddings;
pub mod session;
pub mod sources;
pub mod stores;
pub mod types;

pub use answer::{AnswerFormat, AnswerGenerator, AnswerRequest, ChatMessage, ChatRole, TechnicalLevel};
pub use chunker::{Chunker, ChunkerConfig};
pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider};
pub use session::{RetrievalPlan, RetrievalSession, RetrievalStrategy, SessionConfig};
pub use sources::{BiorxivClient, DocumentSource, SourceDocument, normalize_doi};
pub use stores::{ChunkRecord, MemoryVectorStore, RecordMetadata, VectorStore};
pub use types::{DigestError, Document};
