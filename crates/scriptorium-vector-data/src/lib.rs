//! Scriptorium vector and full-text retrieval storage
//!
//! Owns the two stores `FusionSearchService` blends: `EmbeddingStore`
//! (Qdrant-backed dense vector search, one collection per `EmbeddingKind`)
//! and `Bm25Store` (tantivy-backed sparse term search). Both are addressed
//! by caller-assigned string document ids rather than a backend-native key.

pub mod error;
pub mod storage;

pub use error::{VectorDataError, VectorDataResult};
pub use storage::{
    Bm25Store, Embedding, EmbeddingKind, EmbeddingStore, MockBm25Store, MockEmbeddingStore,
    QdrantEmbeddingStore, TantivyBm25Store, VectorMatch,
};
pub use scriptorium_config::VectorStorageConfig;
