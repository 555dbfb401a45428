//! Storage abstraction traits for embeddings and BM25 postings
//!
//! `EmbeddingStore` and `Bm25Store` are the two retrieval backends
//! `FusionSearchService` blends via reciprocal rank fusion. Both are
//! opaque: callers address documents by a caller-assigned string id and
//! never see the backend's native key format (Qdrant point ids, tantivy
//! doc ids, ...).

use crate::VectorDataResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Which embedding space a vector belongs to. Code and text embeddings are
/// produced by different models and must never be compared against each
/// other, so stores keep them in separate collections/indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingKind {
    Code,
    Text,
}

impl EmbeddingKind {
    /// Stable name used for collection/index naming.
    pub fn as_str(self) -> &'static str {
        match self {
            EmbeddingKind::Code => "code",
            EmbeddingKind::Text => "text",
        }
    }
}

/// A single embedding to persist, keyed by the caller's document id.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub id: String,
    pub kind: EmbeddingKind,
    pub vector: Vec<f32>,
}

/// A single hit from either store, normalized to (document id, score).
/// Scores are backend-native (cosine similarity for embeddings, BM25 score
/// for postings) and are never compared directly across stores — fusion
/// only looks at rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
}

/// Vector similarity storage, addressed by document id rather than a
/// backend-native key.
///
/// The `has_embedding`/`has_embeddings` methods exist for dedupe gating:
/// indexing handlers skip re-embedding documents that already have a
/// vector of the requested kind (spec §4.7).
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Whether `id` already has an embedding of `kind`.
    async fn has_embedding(&self, id: &str, kind: EmbeddingKind) -> VectorDataResult<bool>;

    /// Batched form of `has_embedding`. Returns a map covering every id in
    /// `ids`; ids absent from storage map to `false`.
    async fn has_embeddings(
        &self,
        ids: &[String],
        kind: EmbeddingKind,
    ) -> VectorDataResult<HashMap<String, bool>>;

    /// Upsert embeddings. Each `Embedding::id` is unique within its kind;
    /// re-saving an id replaces the prior vector.
    async fn save_all(&self, embeddings: Vec<Embedding>) -> VectorDataResult<()>;

    /// Nearest-neighbor search within `kind`. When `ids` is `Some`, the
    /// search is restricted to that candidate set (used when the fusion
    /// service re-scores a BM25 candidate list against embeddings).
    async fn search(
        &self,
        kind: EmbeddingKind,
        query: &[f32],
        limit: usize,
        ids: Option<&[String]>,
    ) -> VectorDataResult<Vec<VectorMatch>>;

    /// Remove embeddings of `kind` for the given document ids.
    async fn delete_by(&self, ids: &[String], kind: EmbeddingKind) -> VectorDataResult<()>;
}

/// BM25 full-text posting storage, addressed by document id. Opaque to
/// callers: the tokenizer, analyzer, and on-disk layout are entirely the
/// backend's concern.
#[async_trait]
pub trait Bm25Store: Send + Sync {
    /// Index (or re-index) `text` under `id`. Re-indexing an existing id
    /// replaces its prior postings.
    async fn index(&self, id: &str, text: &str) -> VectorDataResult<()>;

    /// Remove the document with `id`, if present.
    async fn delete(&self, id: &str) -> VectorDataResult<()>;

    /// Ranked BM25 search, highest score first.
    async fn search(&self, query: &str, limit: usize) -> VectorDataResult<Vec<VectorMatch>>;
}
