//! In-memory embedded document collection.
//!
//! Each content category is backed by one collection: a set of pre-embedded
//! document chunks loaded from a JSON file, scored by cosine similarity
//! against the query embedding. A linear scan is plenty at course-content
//! scale.

use super::{RetrievedDocument, SearchBackend};
use crate::embedding::Embedder;
use crate::error::{Result, VeilederError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// One pre-embedded document chunk in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Metadata (at least a `source` key).
    pub metadata: HashMap<String, String>,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl CollectionRecord {
    /// Create a new record with a fresh ID.
    pub fn new(content: String, metadata: HashMap<String, String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            metadata,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// In-memory similarity-search backend over one collection.
pub struct CollectionBackend {
    name: String,
    embedder: Arc<dyn Embedder>,
    records: Vec<CollectionRecord>,
}

impl std::fmt::Debug for CollectionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionBackend")
            .field("name", &self.name)
            .field("records", &self.records.len())
            .finish()
    }
}

impl CollectionBackend {
    /// Build a backend from records already in memory.
    pub fn from_records(
        name: &str,
        embedder: Arc<dyn Embedder>,
        records: Vec<CollectionRecord>,
    ) -> Self {
        Self {
            name: name.to_string(),
            embedder,
            records,
        }
    }

    /// Load a collection from a JSON file (an array of records).
    pub fn load(path: &Path, name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VeilederError::Collection(format!(
                "Failed to read collection '{}' from {}: {}",
                name,
                path.display(),
                e
            ))
        })?;
        let records: Vec<CollectionRecord> = serde_json::from_str(&content)?;

        debug!("Loaded collection '{}' with {} records", name, records.len());
        Ok(Self::from_records(name, embedder, records))
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records in the collection.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl SearchBackend for CollectionBackend {
    async fn search(&self, query: &str, fetch_k: usize) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedder.embed(query).await?;

        let mut results: Vec<RetrievedDocument> = self
            .records
            .iter()
            .map(|record| RetrievedDocument {
                content: record.content.clone(),
                metadata: record.metadata.clone(),
                score: cosine_similarity(&query_embedding, &record.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(fetch_k);

        debug!(
            "Collection '{}' returned {} candidates for query",
            self.name,
            results.len()
        );
        Ok(results)
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn dimensions(&self) -> usize {
            self.0.len()
        }
    }

    fn record(content: &str, embedding: Vec<f32>) -> CollectionRecord {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), format!("{}.md", content));
        CollectionRecord::new(content.to_string(), metadata, embedding)
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let embedder = Arc::new(FixedEmbedder(vec![1.0, 0.0, 0.0]));
        let backend = CollectionBackend::from_records(
            "notes",
            embedder,
            vec![
                record("orthogonal", vec![0.0, 1.0, 0.0]),
                record("exact", vec![1.0, 0.0, 0.0]),
                record("close", vec![0.9, 0.1, 0.0]),
            ],
        );

        let results = backend.search("query", 10).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "exact");
        assert_eq!(results[1].content, "close");
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].source(), Some("exact.md"));
    }

    #[tokio::test]
    async fn test_search_truncates_to_fetch_k() {
        let embedder = Arc::new(FixedEmbedder(vec![1.0, 0.0]));
        let records = (0..10)
            .map(|i| record(&format!("doc{}", i), vec![1.0, i as f32 * 0.01]))
            .collect();
        let backend = CollectionBackend::from_records("notes", embedder, records);

        let results = backend.search("query", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let embedder: Arc<dyn Embedder> = Arc::new(FixedEmbedder(vec![1.0]));
        let err = CollectionBackend::load(Path::new("/nonexistent/notes.json"), "notes", embedder)
            .unwrap_err();
        assert!(matches!(err, VeilederError::Collection(_)));
    }

    #[test]
    fn test_record_roundtrip() {
        let rec = record("hello", vec![0.1, 0.2]);
        let json = serde_json::to_string(&rec).unwrap();
        let back: CollectionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, "hello");
        assert_eq!(back.embedding, vec![0.1, 0.2]);
    }
}
