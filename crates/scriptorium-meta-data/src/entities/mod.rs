//! Entity stores: models, the trait contract, and its Postgres/mock
//! implementations.

pub mod mock;
pub mod models;
pub mod postgres;
pub mod sql;
pub mod traits;

pub use mock::{
    MockAssociationStore, MockCommitStore, MockEnrichmentStore, MockFileStore,
    MockRepositoryStore, MockStatusStore,
};
pub use models::{
    Association, AssociationRow, Commit, Enrichment, EnrichmentRow, EnrichmentType, EntityType,
    File, Repository, RepositoryRow, Status, StatusRow, StatusState, Tracking, WorkingCopy,
};
pub use postgres::{
    PgAssociationStore, PgCommitStore, PgEnrichmentStore, PgFileStore, PgRepositoryStore,
    PgStatusStore,
};
pub use traits::{
    AssociationStore, CommitStore, EnrichmentStore, FileStore, RepositoryStore, StatusStore,
};
