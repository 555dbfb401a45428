pub mod mock;
pub mod qdrant;
pub mod tantivy_bm25;
pub mod traits;

pub use self::mock::{MockBm25Store, MockEmbeddingStore};
pub use self::qdrant::QdrantEmbeddingStore;
pub use self::tantivy_bm25::TantivyBm25Store;
pub use self::traits::{Bm25Store, Embedding, EmbeddingKind, EmbeddingStore, VectorMatch};
pub use scriptorium_config::VectorStorageConfig;
