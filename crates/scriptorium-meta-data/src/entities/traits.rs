//! Store traits: one per entity, each `Find`/`FindOne`/`Save`/`Delete`/
//! `Count` plus entity-specific helpers, exactly the contract the teacher's
//! `FileRepository` trait exposes for the legacy file-indexing domain.

use async_trait::async_trait;

use crate::error::MetaDataResult;
use crate::query::Query;

use super::models::{Association, Commit, Enrichment, File, Repository, Status};

#[async_trait]
pub trait RepositoryStore: Send + Sync {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Repository>>;
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Repository>>;
    async fn find_by_remote_url(&self, remote_url: &str) -> MetaDataResult<Option<Repository>>;
    /// Upsert on `remote_url` (the natural key); returns the row with its
    /// assigned id.
    async fn save(&self, repository: Repository) -> MetaDataResult<Repository>;
    async fn delete(&self, id: i64) -> MetaDataResult<()>;
    async fn count(&self, query: &Query) -> MetaDataResult<i64>;
}

#[async_trait]
pub trait CommitStore: Send + Sync {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Commit>>;
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Commit>>;
    async fn find_by_sha(&self, repo_id: i64, sha: &str) -> MetaDataResult<Option<Commit>>;
    /// Upsert on `(repo_id, sha)`.
    async fn save(&self, commit: Commit) -> MetaDataResult<Commit>;
    async fn delete(&self, repo_id: i64, sha: &str) -> MetaDataResult<()>;
    async fn count(&self, query: &Query) -> MetaDataResult<i64>;
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<File>>;
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<File>>;
    async fn find_for_commit(&self, repo_id: i64, commit_sha: &str) -> MetaDataResult<Vec<File>>;
    /// Upsert on `(repo_id, commit_sha, path)`.
    async fn save(&self, file: File) -> MetaDataResult<File>;
    async fn delete(&self, id: i64) -> MetaDataResult<()>;
    async fn count(&self, query: &Query) -> MetaDataResult<i64>;
}

#[async_trait]
pub trait EnrichmentStore: Send + Sync {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Enrichment>>;
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Enrichment>>;

    /// Find enrichments of `(enrichment_type, subtype)` associated with
    /// `commit_sha` via the commit association join, ordered ascending by
    /// enrichment id (callers rely on this for deterministic document
    /// order downstream).
    async fn find_for_commit(
        &self,
        enrichment_type: &str,
        subtype: &str,
        repo_id: i64,
        commit_sha: &str,
    ) -> MetaDataResult<Vec<Enrichment>>;

    /// Save a brand-new enrichment; always an insert (enrichments are
    /// immutable apart from content-rewrite via a new version).
    async fn save(&self, enrichment: Enrichment) -> MetaDataResult<Enrichment>;

    async fn delete(&self, id: i64) -> MetaDataResult<()>;

    /// `DeleteBy` — bulk delete matching a query, used by the Wiki
    /// handler's "one wiki per repository" invariant.
    async fn delete_by(&self, query: &Query) -> MetaDataResult<u64>;

    async fn count(&self, query: &Query) -> MetaDataResult<i64>;

    /// Save a chunk's `(start_line, end_line)` range alongside its
    /// enrichment row.
    async fn save_chunk_range(
        &self,
        enrichment_id: i64,
        start_line: i32,
        end_line: i32,
    ) -> MetaDataResult<()>;

    /// Cascade-delete a repository and everything that derives from it
    /// (commits, files, enrichments, associations, statuses) in a single
    /// transaction.
    async fn delete_repository_cascade(&self, repo_id: i64) -> MetaDataResult<()>;
}

#[async_trait]
pub trait AssociationStore: Send + Sync {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Association>>;
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Association>>;

    /// The unique association of `entity_type` for `enrichment_id`, if any
    /// (used to resolve a summary's source snippet identifier).
    async fn find_by_entity_type(
        &self,
        enrichment_id: i64,
        entity_type: &str,
    ) -> MetaDataResult<Option<Association>>;

    async fn save(&self, association: Association) -> MetaDataResult<Association>;
    async fn delete(&self, id: i64) -> MetaDataResult<()>;
    async fn count(&self, query: &Query) -> MetaDataResult<i64>;
}

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Status>>;

    /// Insert-or-update keyed by `(operation, trackable_type,
    /// trackable_id, scope)`.
    async fn save(&self, status: Status) -> MetaDataResult<Status>;

    async fn delete(&self, id: i64) -> MetaDataResult<()>;
}
