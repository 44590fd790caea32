//! In-memory vector index with brute-force cosine similarity search.
//!
//! All operations are O(n) for search, which is fine for the few hundred
//! rows of the travel datasets.

use std::sync::{Arc, RwLock};

use crate::error::IndexError;

/// A single hit returned from a vector search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Insertion position of the matching entry.
    pub id: usize,
    /// Cosine similarity score.
    pub score: f64,
    /// The indexed document text.
    pub document: String,
}

#[derive(Debug, Clone)]
struct VectorEntry {
    embedding: Vec<f32>,
    document: String,
}

/// In-memory vector index. Thread-safe via interior RwLock.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Arc<RwLock<Vec<VectorEntry>>>,
}

impl VectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a vector with its document text; returns the entry id.
    pub fn insert(&self, embedding: Vec<f32>, document: String) -> Result<usize, IndexError> {
        if embedding.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|e| IndexError::LockPoisoned(e.to_string()))?;
        entries.push(VectorEntry {
            embedding,
            document,
        });
        Ok(entries.len() - 1)
    }

    /// The k nearest entries to `query` by cosine similarity, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        let entries = self
            .entries
            .read()
            .map_err(|e| IndexError::LockPoisoned(e.to_string()))?;

        let mut scored: Vec<SearchHit> = entries
            .iter()
            .enumerate()
            .map(|(id, entry)| SearchHit {
                id,
                score: cosine_similarity(query, &entry.embedding),
                document: entry.document.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_search() {
        let index = VectorIndex::new(3);
        index.insert(vec![1.0, 0.0, 0.0], "x".to_string()).unwrap();
        index.insert(vec![0.0, 1.0, 0.0], "y".to_string()).unwrap();
        index.insert(vec![0.7, 0.7, 0.0], "xy".to_string()).unwrap();

        let hits = index.search(&[1.0, 0.1, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "x");
        assert_eq!(hits[1].document, "xy");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::new(2);
        index.insert(vec![1.0, 0.0], "first".to_string()).unwrap();
        index.insert(vec![1.0, 0.0], "second".to_string()).unwrap();
        let hits = index.search(&[1.0, 0.0], 5).unwrap();
        assert_eq!(hits[0].document, "first");
        assert_eq!(hits[1].id, 1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = VectorIndex::new(3);
        assert!(matches!(
            index.insert(vec![1.0], "bad".to_string()),
            Err(IndexError::DimensionMismatch { expected: 3, actual: 1 })
        ));
        assert!(index.search(&[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn test_empty_index() {
        let index = VectorIndex::new(2);
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
    }
}
