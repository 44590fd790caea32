//! Document retrieval: embed dataset documents once, answer text queries
//! with the closest snippets.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::DynEmbeddingService;
use crate::error::IndexError;
use crate::index::VectorIndex;

/// A similarity-search index over text documents.
#[derive(Clone)]
pub struct RetrievalIndex {
    embedder: Arc<dyn DynEmbeddingService>,
    index: VectorIndex,
}

impl std::fmt::Debug for RetrievalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalIndex")
            .field("documents", &self.index.len())
            .field("dimensions", &self.index.dimensions())
            .finish()
    }
}

impl RetrievalIndex {
    /// Embed and index every non-blank document, keeping their order.
    pub async fn build(
        documents: Vec<String>,
        embedder: Arc<dyn DynEmbeddingService>,
    ) -> Result<Self, IndexError> {
        let index = VectorIndex::new(embedder.dimensions());
        for doc in documents {
            if doc.trim().is_empty() {
                continue;
            }
            let vector = embedder.embed_boxed(&doc).await?;
            index.insert(vector, doc)?;
        }
        info!(documents = index.len(), "retrieval index built");
        Ok(Self { embedder, index })
    }

    /// The `k` documents most similar to `query`, best first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, IndexError> {
        let vector = self.embedder.embed_boxed(query).await?;
        let hits = self.index.search(&vector, k)?;
        debug!(query, hits = hits.len(), "retrieval search");
        Ok(hits.into_iter().map(|h| h.document).collect())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedding;

    fn docs() -> Vec<String> {
        vec![
            "Transport Schedule: destination: Surabaya, mode: kereta, price: 150000".to_string(),
            "Transport Schedule: destination: Bandung, mode: bus, price: 90000".to_string(),
            "".to_string(),
            "Hotel Availability: location: Malang, hotel_name: Hotel Tugu".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_build_skips_blank_documents() {
        let index = RetrievalIndex::build(docs(), Arc::new(HashingEmbedding::new(128)))
            .await
            .unwrap();
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_search_ranks_matching_city_first() {
        let index = RetrievalIndex::build(docs(), Arc::new(HashingEmbedding::new(512)))
            .await
            .unwrap();
        let hits = index.search("bus Bandung", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].contains("Bandung"));
    }

    #[tokio::test]
    async fn test_search_empty_query_is_error() {
        let index = RetrievalIndex::build(docs(), Arc::new(HashingEmbedding::default()))
            .await
            .unwrap();
        assert!(index.search("", 3).await.is_err());
    }
}
