//! In-memory `EmbeddingStore`/`Bm25Store` doubles for tests.

use crate::error::VectorDataResult;
use crate::storage::traits::{Bm25Store, Embedding, EmbeddingKind, EmbeddingStore, VectorMatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory embedding store. Cosine similarity over a `Vec<(id, vector)>`
/// per kind; fine for unit tests, not a serious ANN index.
#[derive(Default)]
pub struct MockEmbeddingStore {
    vectors: Mutex<HashMap<EmbeddingKind, HashMap<String, Vec<f32>>>>,
    fail: bool,
}

impl MockEmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            vectors: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    fn check(&self) -> VectorDataResult<()> {
        if self.fail {
            return Err(crate::error::VectorDataError::Storage(
                "mock embedding store configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl EmbeddingStore for MockEmbeddingStore {
    async fn has_embedding(&self, id: &str, kind: EmbeddingKind) -> VectorDataResult<bool> {
        self.check()?;
        let vectors = self.vectors.lock().expect("mock embedding store lock");
        Ok(vectors.get(&kind).is_some_and(|m| m.contains_key(id)))
    }

    async fn has_embeddings(
        &self,
        ids: &[String],
        kind: EmbeddingKind,
    ) -> VectorDataResult<HashMap<String, bool>> {
        self.check()?;
        let vectors = self.vectors.lock().expect("mock embedding store lock");
        let present = vectors.get(&kind);
        Ok(ids
            .iter()
            .map(|id| (id.clone(), present.is_some_and(|m| m.contains_key(id))))
            .collect())
    }

    async fn save_all(&self, embeddings: Vec<Embedding>) -> VectorDataResult<()> {
        self.check()?;
        let mut vectors = self.vectors.lock().expect("mock embedding store lock");
        for embedding in embeddings {
            vectors
                .entry(embedding.kind)
                .or_default()
                .insert(embedding.id, embedding.vector);
        }
        Ok(())
    }

    async fn search(
        &self,
        kind: EmbeddingKind,
        query: &[f32],
        limit: usize,
        ids: Option<&[String]>,
    ) -> VectorDataResult<Vec<VectorMatch>> {
        self.check()?;
        let vectors = self.vectors.lock().expect("mock embedding store lock");
        let Some(space) = vectors.get(&kind) else {
            return Ok(Vec::new());
        };
        let mut scored: Vec<VectorMatch> = space
            .iter()
            .filter(|(id, _)| ids.is_none_or(|allowed| allowed.contains(id)))
            .map(|(id, vector)| VectorMatch {
                id: id.clone(),
                score: cosine(query, vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn delete_by(&self, ids: &[String], kind: EmbeddingKind) -> VectorDataResult<()> {
        self.check()?;
        let mut vectors = self.vectors.lock().expect("mock embedding store lock");
        if let Some(space) = vectors.get_mut(&kind) {
            for id in ids {
                space.remove(id);
            }
        }
        Ok(())
    }
}

/// In-memory BM25 double. Ranks by naive term-overlap count rather than a
/// real BM25 score — good enough to exercise fusion logic in tests.
#[derive(Default)]
pub struct MockBm25Store {
    documents: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl MockBm25Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    fn check(&self) -> VectorDataResult<()> {
        if self.fail {
            return Err(crate::error::VectorDataError::Storage(
                "mock bm25 store configured to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Bm25Store for MockBm25Store {
    async fn index(&self, id: &str, text: &str) -> VectorDataResult<()> {
        self.check()?;
        self.documents
            .lock()
            .expect("mock bm25 store lock")
            .insert(id.to_string(), text.to_lowercase());
        Ok(())
    }

    async fn delete(&self, id: &str) -> VectorDataResult<()> {
        self.check()?;
        self.documents
            .lock()
            .expect("mock bm25 store lock")
            .remove(id);
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> VectorDataResult<Vec<VectorMatch>> {
        self.check()?;
        let terms: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
        let documents = self.documents.lock().expect("mock bm25 store lock");
        let mut scored: Vec<VectorMatch> = documents
            .iter()
            .filter_map(|(id, text)| {
                let hits = terms.iter().filter(|t| text.contains(t.as_str())).count();
                (hits > 0).then_some(VectorMatch {
                    id: id.clone(),
                    score: hits as f32,
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedding_dedupe_gating_round_trips() {
        let store = MockEmbeddingStore::new();
        assert!(!store.has_embedding("doc-1", EmbeddingKind::Code).await.unwrap());
        store
            .save_all(vec![Embedding {
                id: "doc-1".to_string(),
                kind: EmbeddingKind::Code,
                vector: vec![1.0, 0.0],
            }])
            .await
            .unwrap();
        assert!(store.has_embedding("doc-1", EmbeddingKind::Code).await.unwrap());
        assert!(!store.has_embedding("doc-1", EmbeddingKind::Text).await.unwrap());
    }

    #[tokio::test]
    async fn embedding_search_ranks_by_cosine_similarity() {
        let store = MockEmbeddingStore::new();
        store
            .save_all(vec![
                Embedding {
                    id: "a".to_string(),
                    kind: EmbeddingKind::Code,
                    vector: vec![1.0, 0.0],
                },
                Embedding {
                    id: "b".to_string(),
                    kind: EmbeddingKind::Code,
                    vector: vec![0.0, 1.0],
                },
            ])
            .await
            .unwrap();
        let results = store
            .search(EmbeddingKind::Code, &[1.0, 0.0], 2, None)
            .await
            .unwrap();
        assert_eq!(results[0].id, "a");
    }

    #[tokio::test]
    async fn bm25_search_finds_indexed_text() {
        let store = MockBm25Store::new();
        store.index("doc-1", "fn parse_query").await.unwrap();
        store.index("doc-2", "fn render_page").await.unwrap();
        let results = store.search("parse", 10).await.unwrap();
        assert_eq!(results[0].id, "doc-1");
    }

    #[tokio::test]
    async fn failure_mode_propagates_for_both_stores() {
        let embeddings = MockEmbeddingStore::with_failure();
        assert!(embeddings.has_embedding("x", EmbeddingKind::Code).await.is_err());

        let bm25 = MockBm25Store::with_failure();
        assert!(bm25.index("x", "y").await.is_err());
    }
}
