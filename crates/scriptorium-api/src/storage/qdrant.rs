//! Qdrant vector database storage backend for semantic code search.
//!
//! This module provides the [`QdrantStorage`] client for storing and retrieving
//! code embeddings using Qdrant's vector database. It implements the storage
//! layer for the scriptorium system, enabling semantic search across codebases
//! through high-dimensional vector similarity matching.
//!
//! # Storage Strategy
//!
//! The storage layer uses Qdrant to:
//! - Store high-dimensional embeddings (vectors) of code chunks
//! - Associate metadata with each vector (file path, function name, etc.)
//! - Perform fast approximate nearest neighbor search for semantic similarity
//! - Scale horizontally for large codebases
//!
//! # Example
//!
//! ```rust,no_run
//! use scriptorium_api::storage::QdrantStorage;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = QdrantStorage::new();
//! let query_embedding = vec![0.1, 0.2, 0.3]; // Example embedding
//! let results = storage.search(query_embedding, 10).await?;
//! # Ok(())
//! # }
//! ```

use crate::Result;

/// Vector database client for storing and searching code embeddings using Qdrant.
///
/// `QdrantStorage` serves as the primary interface to the Qdrant vector database,
/// handling the storage and retrieval of code embeddings for semantic search.
/// It abstracts away the complexities of vector database operations while
/// providing a clean API for the indexing and search pipeline.
///
/// # Architecture
///
/// The client is designed to be:
/// - **Async-first**: All operations are non-blocking
/// - **Lightweight**: Minimal overhead for high-performance search
/// - **Scalable**: Can handle large codebases efficiently
/// - **Fault-tolerant**: Graceful error handling and recovery
///
/// # Future Implementation
///
/// Currently a stub implementation. Will include:
/// - Qdrant gRPC client connection
/// - Collection management for different projects
/// - Batch operations for efficient indexing
/// - Connection pooling and retry logic
pub struct QdrantStorage {
    // TODO: Add client field for Qdrant gRPC client
    // TODO: Add connection pool for concurrent operations
    // TODO: Add collection configuration
}

impl Default for QdrantStorage {
    /// Creates a new `QdrantStorage` instance with default configuration.
    ///
    /// This provides a convenient way to initialize the storage client
    /// when using derive macros or when explicit configuration isn't needed.
    fn default() -> Self {
        Self::new()
    }
}

impl QdrantStorage {
    /// Creates a new `QdrantStorage` client instance.
    ///
    /// Initializes the Qdrant storage client with default settings.
    /// In the future implementation, this will establish the connection
    /// to the Qdrant server and set up the necessary collections.
    ///
    /// # Returns
    ///
    /// A new `QdrantStorage` instance ready for vector operations.
    ///
    /// # Example
    ///
    /// ```rust
    /// use scriptorium_api::storage::QdrantStorage;
    ///
    /// let storage = QdrantStorage::new();
    /// ```
    pub fn new() -> Self {
        Self {
            // TODO: Initialize Qdrant client with connection parameters
            // TODO: Set up default collection if it doesn't exist
        }
    }

    /// Performs semantic similarity search using vector embeddings.
    ///
    /// Searches for the most similar code chunks to the provided query vector
    /// using approximate nearest neighbor search. The search is performed in
    /// high-dimensional space where semantically similar code will have
    /// vectors that are close together.
    ///
    /// # Parameters
    ///
    /// * `query` - The query embedding vector (typically 768 or 1536 dimensions)
    /// * `limit` - Maximum number of results to return
    ///
    /// # Returns
    ///
    /// A vector of matching code chunk identifiers, ordered by similarity score
    /// (most similar first). In the full implementation, this will include
    /// metadata like file paths, function names, and similarity scores.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The vector database is unreachable
    /// - The query vector has incorrect dimensions
    /// - The collection doesn't exist
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use scriptorium_api::storage::QdrantStorage;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let storage = QdrantStorage::new();
    /// let query_vector = vec![0.1, 0.2, 0.3]; // Real embeddings are 768+ dims
    /// let results = storage.search(query_vector, 5).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Implementation Notes
    ///
    /// The search operation will:
    /// 1. Validate the query vector dimensions
    /// 2. Perform approximate nearest neighbor search in Qdrant
    /// 3. Apply any filtering based on metadata (file types, projects, etc.)
    /// 4. Return results sorted by cosine similarity score
    pub async fn search(&self, _query: Vec<f32>, _limit: usize) -> Result<Vec<String>> {
        // TODO: Validate query vector dimensions
        // TODO: Perform vector similarity search in Qdrant
        // TODO: Apply metadata filtering if specified
        // TODO: Return structured results with scores and metadata
        Ok(vec![])
    }
}
