//! Scriptorium metadata layer for `PostgreSQL` state management
//!
//! Owns the entity stores (repositories, commits, files, enrichments,
//! associations, statuses), the query algebra they're accessed through,
//! the progress tracker, and git working-copy detection. The durable task
//! queue lives in `scriptorium-queue`, which depends on this crate only
//! for `PoolManager`.

// Module declarations
pub mod entities;
pub mod error;
pub mod git;
pub mod migrations;
pub mod pool;
pub mod pool_builder;
pub mod pool_manager;
pub mod query;
pub mod tracker;

// Public exports
// Use unified DatabaseConfig from scriptorium-config
pub use entities::{
    Association, AssociationStore, Commit, CommitStore, Enrichment, EnrichmentStore, File,
    FileStore, MockAssociationStore, MockCommitStore, MockEnrichmentStore, MockFileStore,
    MockRepositoryStore, MockStatusStore, PgAssociationStore, PgCommitStore, PgEnrichmentStore,
    PgFileStore, PgRepositoryStore, PgStatusStore, Repository, RepositoryStore, Status,
    StatusStore, Tracking, WorkingCopy,
};
pub use error::{
    ConnectionPoolType, DatabaseError, DatabaseErrorExt, DatabaseOperation, DatabaseResult,
    MetaDataError, MetaDataErrorExt, MetaDataResult,
};
pub use git::{Git2Adapter, GitAdapter, GitAdapterError, MockGitAdapter, RepositoryContext};
pub use migrations::{run_migrations, wait_for_migrations};
pub use pool::{create_pool, initialize_database};
pub use pool_builder::PoolConfigBuilder;
pub use pool_manager::{PoolConfig, PoolManager};
pub use query::{Cond, Query, QueryError, QueryTranslator};
pub use scriptorium_config::DatabaseConfig;
pub use tracker::{PgTrackerFactory, Tracker, TrackerFactory};
