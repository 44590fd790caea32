//! Wisata Vector crate - embedding service and similarity-search index.
//!
//! Provides a deterministic hashing embedding, an in-memory cosine index,
//! and the `RetrievalIndex` that turns dataset documents into searchable
//! snippets for the transport-schedule tool.

pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;

pub use embedding::{DynEmbeddingService, EmbeddingService, HashingEmbedding};
pub use error::IndexError;
pub use index::{SearchHit, VectorIndex};
pub use retrieval::RetrievalIndex;
