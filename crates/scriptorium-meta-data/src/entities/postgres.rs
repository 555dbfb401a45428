//! Postgres-backed store implementations
//!
//! Follows the same shape as `crate::repository::DbFileRepository`: a
//! struct wrapping `PoolManager`, `sqlx::query` built with plain strings
//! (never compile-time `query!` macros, since that needs a live database at
//! build time), errors mapped through `map_db_err`/`map_meta_err`.

use async_trait::async_trait;
use sqlx::Row;

use crate::error::{DatabaseOperation, MetaDataErrorExt, MetaDataResult};
use crate::pool_manager::PoolManager;
use crate::query::Query;

use super::models::{
    Association, AssociationRow, Commit, Enrichment, EnrichmentRow, File, Repository,
    RepositoryRow, Status, StatusRow, WorkingCopy,
};
use super::sql::{bind_value, build_fragment};
use super::traits::{
    AssociationStore, CommitStore, EnrichmentStore, FileStore, RepositoryStore, StatusStore,
};

/// `repositories` table.
pub struct PgRepositoryStore {
    pools: PoolManager,
}

impl PgRepositoryStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const REPOSITORY_FIELDS: &[&str] = &["id", "remote_url"];
const REPOSITORY_SELECT: &str = r"
    SELECT id, remote_url, local_path, working_copy_remote, tracking_kind, tracking_value,
           created_at, updated_at
    FROM repositories
";

#[async_trait]
impl RepositoryStore for PgRepositoryStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Repository>> {
        let translated = build_fragment(REPOSITORY_FIELDS, query)?;
        let sql = format!("{REPOSITORY_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, RepositoryRow>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        let rows = q
            .fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.find".to_string(),
            }, None)?;
        Ok(rows.into_iter().map(Repository::from).collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Repository>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_remote_url(&self, remote_url: &str) -> MetaDataResult<Option<Repository>> {
        let sql = format!("{REPOSITORY_SELECT} WHERE remote_url = $1");
        let row = sqlx::query_as::<_, RepositoryRow>(&sql)
            .bind(remote_url)
            .fetch_optional(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.find_by_remote_url".to_string(),
            }, None)?;
        Ok(row.map(Repository::from))
    }

    async fn save(&self, repository: Repository) -> MetaDataResult<Repository> {
        let (local_path, working_copy_remote) = match &repository.working_copy {
            Some(WorkingCopy { local_path, remote }) => (
                Some(local_path.to_string_lossy().to_string()),
                Some(remote.clone()),
            ),
            None => (None, None),
        };
        let (tracking_kind, tracking_value) = match &repository.tracking {
            Some(crate::entities::models::Tracking::Branch(v)) => {
                (Some("branch"), Some(v.clone()))
            }
            Some(crate::entities::models::Tracking::Tag(v)) => (Some("tag"), Some(v.clone())),
            Some(crate::entities::models::Tracking::Commit(v)) => {
                (Some("commit"), Some(v.clone()))
            }
            None => (None, None),
        };

        let row = sqlx::query_as::<_, RepositoryRow>(
            r"
            INSERT INTO repositories
                (remote_url, local_path, working_copy_remote, tracking_kind, tracking_value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (remote_url) DO UPDATE SET
                local_path = EXCLUDED.local_path,
                working_copy_remote = EXCLUDED.working_copy_remote,
                tracking_kind = EXCLUDED.tracking_kind,
                tracking_value = EXCLUDED.tracking_value,
                updated_at = now()
            RETURNING id, remote_url, local_path, working_copy_remote, tracking_kind,
                      tracking_value, created_at, updated_at
            ",
        )
        .bind(&repository.remote_url)
        .bind(local_path)
        .bind(working_copy_remote)
        .bind(tracking_kind)
        .bind(tracking_value)
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "repositories.save".to_string(),
        }, None)?;
        Ok(Repository::from(row))
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(id)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete".to_string(),
            }, None)?;
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        let translated = build_fragment(REPOSITORY_FIELDS, query)?;
        let sql = format!("SELECT count(*) FROM repositories {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let row = q
            .fetch_one(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.count".to_string(),
            }, None)?;
        Ok(row.get::<i64, _>(0))
    }
}

/// `commits` table, keyed by `(repo_id, sha)`.
pub struct PgCommitStore {
    pools: PoolManager,
}

impl PgCommitStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const COMMIT_FIELDS: &[&str] = &["repo_id", "sha", "parent_sha"];
const COMMIT_SELECT: &str = r"
    SELECT repo_id, sha, message, author_name, author_email, committer_name, committer_email,
           authored_at, committed_at, parent_sha
    FROM commits
";

#[async_trait]
impl CommitStore for PgCommitStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Commit>> {
        let translated = build_fragment(COMMIT_FIELDS, query)?;
        let sql = format!("{COMMIT_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, Commit>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        q.fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "commits.find".to_string(),
            }, None)
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Commit>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_sha(&self, repo_id: i64, sha: &str) -> MetaDataResult<Option<Commit>> {
        let sql = format!("{COMMIT_SELECT} WHERE repo_id = $1 AND sha = $2");
        sqlx::query_as::<_, Commit>(&sql)
            .bind(repo_id)
            .bind(sha)
            .fetch_optional(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "commits.find_by_sha".to_string(),
            }, None)
    }

    async fn save(&self, commit: Commit) -> MetaDataResult<Commit> {
        let row = sqlx::query_as::<_, Commit>(
            r"
            INSERT INTO commits
                (repo_id, sha, message, author_name, author_email, committer_name,
                 committer_email, authored_at, committed_at, parent_sha)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (repo_id, sha) DO UPDATE SET
                message = EXCLUDED.message
            RETURNING repo_id, sha, message, author_name, author_email, committer_name,
                      committer_email, authored_at, committed_at, parent_sha
            ",
        )
        .bind(commit.repo_id)
        .bind(&commit.sha)
        .bind(&commit.message)
        .bind(&commit.author_name)
        .bind(&commit.author_email)
        .bind(&commit.committer_name)
        .bind(&commit.committer_email)
        .bind(commit.authored_at)
        .bind(commit.committed_at)
        .bind(&commit.parent_sha)
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "commits.save".to_string(),
        }, None)?;
        Ok(row)
    }

    async fn delete(&self, repo_id: i64, sha: &str) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM commits WHERE repo_id = $1 AND sha = $2")
            .bind(repo_id)
            .bind(sha)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "commits.delete".to_string(),
            }, None)?;
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        let translated = build_fragment(COMMIT_FIELDS, query)?;
        let sql = format!("SELECT count(*) FROM commits {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let row = q
            .fetch_one(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "commits.count".to_string(),
            }, None)?;
        Ok(row.get::<i64, _>(0))
    }
}

/// `files` table.
pub struct PgFileStore {
    pools: PoolManager,
}

impl PgFileStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const FILE_FIELDS: &[&str] = &["id", "repo_id", "commit_sha", "path"];
const FILE_SELECT: &str = r"
    SELECT id, repo_id, commit_sha, path, blob_sha, size, extension, language, mime_type
    FROM files
";

#[async_trait]
impl FileStore for PgFileStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<File>> {
        let translated = build_fragment(FILE_FIELDS, query)?;
        let sql = format!("{FILE_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, File>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        q.fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "files.find".to_string(),
            }, None)
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<File>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_for_commit(&self, repo_id: i64, commit_sha: &str) -> MetaDataResult<Vec<File>> {
        let sql = format!("{FILE_SELECT} WHERE repo_id = $1 AND commit_sha = $2 ORDER BY path ASC");
        sqlx::query_as::<_, File>(&sql)
            .bind(repo_id)
            .bind(commit_sha)
            .fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "files.find_for_commit".to_string(),
            }, None)
    }

    async fn save(&self, file: File) -> MetaDataResult<File> {
        sqlx::query_as::<_, File>(
            r"
            INSERT INTO files (repo_id, commit_sha, path, blob_sha, size, extension, language,
                                mime_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (repo_id, commit_sha, path) DO UPDATE SET
                blob_sha = EXCLUDED.blob_sha,
                size = EXCLUDED.size,
                extension = EXCLUDED.extension,
                language = EXCLUDED.language,
                mime_type = EXCLUDED.mime_type
            RETURNING id, repo_id, commit_sha, path, blob_sha, size, extension, language,
                      mime_type
            ",
        )
        .bind(file.repo_id)
        .bind(&file.commit_sha)
        .bind(&file.path)
        .bind(&file.blob_sha)
        .bind(file.size)
        .bind(&file.extension)
        .bind(&file.language)
        .bind(&file.mime_type)
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "files.save".to_string(),
        }, None)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "files.delete".to_string(),
            }, None)?;
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        let translated = build_fragment(FILE_FIELDS, query)?;
        let sql = format!("SELECT count(*) FROM files {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let row = q
            .fetch_one(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "files.count".to_string(),
            }, None)?;
        Ok(row.get::<i64, _>(0))
    }
}

/// `enrichments` table, plus the `chunk_ranges`/cascade-delete helpers.
pub struct PgEnrichmentStore {
    pools: PoolManager,
}

impl PgEnrichmentStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const ENRICHMENT_FIELDS: &[&str] = &["id", "enrichment_type", "subtype", "entity_key"];
const ENRICHMENT_SELECT: &str = r"
    SELECT id, enrichment_type, subtype, entity_key, content, language, created_at, updated_at
    FROM enrichments
";

#[async_trait]
impl EnrichmentStore for PgEnrichmentStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Enrichment>> {
        let translated = build_fragment(ENRICHMENT_FIELDS, query)?;
        let sql = format!("{ENRICHMENT_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, EnrichmentRow>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        let rows = q
            .fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "enrichments.find".to_string(),
            }, None)?;
        rows.into_iter()
            .map(|row| {
                Enrichment::try_from(row)
                    .map_err(crate::error::MetaDataError::Other)
            })
            .collect()
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Enrichment>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_for_commit(
        &self,
        enrichment_type: &str,
        subtype: &str,
        repo_id: i64,
        commit_sha: &str,
    ) -> MetaDataResult<Vec<Enrichment>> {
        let sql = format!(
            "{ENRICHMENT_SELECT} \
             JOIN associations ON associations.enrichment_id = enrichments.id \
             JOIN commits ON commits.repo_id = $1 AND commits.sha = $2 \
             WHERE enrichment_type = $3 AND subtype = $4 \
             AND associations.entity_type = 'commit' AND associations.entity_id = commits.id \
             ORDER BY enrichments.id ASC"
        );
        let rows = sqlx::query_as::<_, EnrichmentRow>(&sql)
            .bind(repo_id)
            .bind(commit_sha)
            .bind(enrichment_type)
            .bind(subtype)
            .fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "enrichments.find_for_commit".to_string(),
            }, None)?;
        rows.into_iter()
            .map(|row| {
                Enrichment::try_from(row)
                    .map_err(crate::error::MetaDataError::Other)
            })
            .collect()
    }

    async fn save(&self, enrichment: Enrichment) -> MetaDataResult<Enrichment> {
        let row = sqlx::query_as::<_, EnrichmentRow>(
            r"
            INSERT INTO enrichments (enrichment_type, subtype, entity_key, content, language)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, enrichment_type, subtype, entity_key, content, language, created_at,
                      updated_at
            ",
        )
        .bind(enrichment.enrichment_type.as_str())
        .bind(&enrichment.subtype)
        .bind(&enrichment.entity_key)
        .bind(&enrichment.content)
        .bind(&enrichment.language)
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "enrichments.save".to_string(),
        }, None)?;
        Enrichment::try_from(row).map_err(crate::error::MetaDataError::Other)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM enrichments WHERE id = $1")
            .bind(id)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "enrichments.delete".to_string(),
            }, None)?;
        Ok(())
    }

    async fn delete_by(&self, query: &Query) -> MetaDataResult<u64> {
        let translated = build_fragment(ENRICHMENT_FIELDS, query)?;
        let sql = format!("DELETE FROM enrichments {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let result = q
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "enrichments.delete_by".to_string(),
            }, None)?;
        Ok(result.rows_affected())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        let translated = build_fragment(ENRICHMENT_FIELDS, query)?;
        let sql = format!("SELECT count(*) FROM enrichments {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let row = q
            .fetch_one(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "enrichments.count".to_string(),
            }, None)?;
        Ok(row.get::<i64, _>(0))
    }

    async fn save_chunk_range(
        &self,
        enrichment_id: i64,
        start_line: i32,
        end_line: i32,
    ) -> MetaDataResult<()> {
        sqlx::query(
            r"
            INSERT INTO chunk_ranges (enrichment_id, start_line, end_line)
            VALUES ($1, $2, $3)
            ON CONFLICT (enrichment_id) DO UPDATE SET
                start_line = EXCLUDED.start_line,
                end_line = EXCLUDED.end_line
            ",
        )
        .bind(enrichment_id)
        .bind(start_line)
        .bind(end_line)
        .execute(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "chunk_ranges.save".to_string(),
        }, None)?;
        Ok(())
    }

    async fn delete_repository_cascade(&self, repo_id: i64) -> MetaDataResult<()> {
        let mut tx = self
            .pools
            .write_pool()
            .begin()
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete_cascade.begin".to_string(),
            }, None)?;

        sqlx::query(
            r"
            DELETE FROM chunk_ranges
            WHERE enrichment_id IN (
                SELECT enrichments.id FROM enrichments
                JOIN associations ON associations.enrichment_id = enrichments.id
                JOIN commits ON commits.repo_id = $1 AND commits.id = associations.entity_id
                    AND associations.entity_type = 'commit'
            )
            ",
        )
        .bind(repo_id)
        .execute(&mut *tx)
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "repositories.delete_cascade.chunk_ranges".to_string(),
        }, None)?;

        sqlx::query(
            r"
            DELETE FROM associations
            WHERE entity_type = 'commit' AND entity_id IN (
                SELECT id FROM commits WHERE repo_id = $1
            )
            ",
        )
        .bind(repo_id)
        .execute(&mut *tx)
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "repositories.delete_cascade.associations".to_string(),
        }, None)?;

        sqlx::query(
            r"
            DELETE FROM enrichments
            WHERE id NOT IN (SELECT enrichment_id FROM associations)
            ",
        )
        .execute(&mut *tx)
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "repositories.delete_cascade.enrichments".to_string(),
        }, None)?;

        sqlx::query("DELETE FROM files WHERE repo_id = $1")
            .bind(repo_id)
            .execute(&mut *tx)
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete_cascade.files".to_string(),
            }, None)?;

        sqlx::query("DELETE FROM commits WHERE repo_id = $1")
            .bind(repo_id)
            .execute(&mut *tx)
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete_cascade.commits".to_string(),
            }, None)?;

        sqlx::query("DELETE FROM statuses WHERE trackable_type = 'repository' AND trackable_id = $1")
            .bind(repo_id)
            .execute(&mut *tx)
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete_cascade.statuses".to_string(),
            }, None)?;

        sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(repo_id)
            .execute(&mut *tx)
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "repositories.delete_cascade.repositories".to_string(),
            }, None)?;

        tx.commit().await.map_meta_err(DatabaseOperation::Query {
            description: "repositories.delete_cascade.commit".to_string(),
        }, None)?;
        Ok(())
    }
}

/// `associations` table.
pub struct PgAssociationStore {
    pools: PoolManager,
}

impl PgAssociationStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const ASSOCIATION_FIELDS: &[&str] = &["id", "enrichment_id", "entity_id", "entity_type"];
const ASSOCIATION_SELECT: &str = r"
    SELECT id, enrichment_id, entity_id, entity_type
    FROM associations
";

#[async_trait]
impl AssociationStore for PgAssociationStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Association>> {
        let translated = build_fragment(ASSOCIATION_FIELDS, query)?;
        let sql = format!("{ASSOCIATION_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, AssociationRow>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        let rows = q
            .fetch_all(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "associations.find".to_string(),
            }, None)?;
        rows.into_iter()
            .map(|row| {
                Association::try_from(row)
                    .map_err(crate::error::MetaDataError::Other)
            })
            .collect()
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Association>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_entity_type(
        &self,
        enrichment_id: i64,
        entity_type: &str,
    ) -> MetaDataResult<Option<Association>> {
        let sql = format!("{ASSOCIATION_SELECT} WHERE enrichment_id = $1 AND entity_type = $2");
        let row = sqlx::query_as::<_, AssociationRow>(&sql)
            .bind(enrichment_id)
            .bind(entity_type)
            .fetch_optional(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "associations.find_by_entity_type".to_string(),
            }, None)?;
        row.map(|row| Association::try_from(row).map_err(crate::error::MetaDataError::Other))
            .transpose()
    }

    async fn save(&self, association: Association) -> MetaDataResult<Association> {
        let row = sqlx::query_as::<_, AssociationRow>(
            r"
            INSERT INTO associations (enrichment_id, entity_id, entity_type)
            VALUES ($1, $2, $3)
            RETURNING id, enrichment_id, entity_id, entity_type
            ",
        )
        .bind(association.enrichment_id)
        .bind(association.entity_id)
        .bind(association.entity_type.as_str())
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "associations.save".to_string(),
        }, None)?;
        Association::try_from(row).map_err(crate::error::MetaDataError::Other)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM associations WHERE id = $1")
            .bind(id)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "associations.delete".to_string(),
            }, None)?;
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        let translated = build_fragment(ASSOCIATION_FIELDS, query)?;
        let sql = format!("SELECT count(*) FROM associations {}", translated.sql);
        let mut q = sqlx::query(&sql);
        for bind in &translated.binds {
            q = bind_value(q, bind);
        }
        let row = q
            .fetch_one(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "associations.count".to_string(),
            }, None)?;
        Ok(row.get::<i64, _>(0))
    }
}

/// `statuses` table, backing the progress tracker.
pub struct PgStatusStore {
    pools: PoolManager,
}

impl PgStatusStore {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const STATUS_SELECT: &str = r"
    SELECT id, operation, trackable_type, trackable_id, scope, state, current_count,
           total_count, message, created_at, updated_at
    FROM statuses
";

#[async_trait]
impl StatusStore for PgStatusStore {
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Status>> {
        const STATUS_FIELDS: &[&str] =
            &["id", "operation", "trackable_type", "trackable_id", "scope"];
        let translated = build_fragment(STATUS_FIELDS, query)?;
        let sql = format!("{STATUS_SELECT} {}", translated.sql);
        let mut q = sqlx::query_as::<_, StatusRow>(&sql);
        for bind in &translated.binds {
            q = bind_as(q, bind);
        }
        let row = q
            .fetch_optional(self.pools.read_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "statuses.find_one".to_string(),
            }, None)?;
        row.map(|row| Status::try_from(row).map_err(crate::error::MetaDataError::Other))
            .transpose()
    }

    async fn save(&self, status: Status) -> MetaDataResult<Status> {
        let row = sqlx::query_as::<_, StatusRow>(
            r"
            INSERT INTO statuses
                (operation, trackable_type, trackable_id, scope, state, current_count,
                 total_count, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (operation, trackable_type, trackable_id, scope) DO UPDATE SET
                state = EXCLUDED.state,
                current_count = EXCLUDED.current_count,
                total_count = EXCLUDED.total_count,
                message = EXCLUDED.message,
                updated_at = now()
            RETURNING id, operation, trackable_type, trackable_id, scope, state, current_count,
                      total_count, message, created_at, updated_at
            ",
        )
        .bind(&status.operation)
        .bind(&status.trackable_type)
        .bind(status.trackable_id)
        .bind(&status.scope)
        .bind(status.state.as_str())
        .bind(status.current_count)
        .bind(status.total_count)
        .bind(&status.message)
        .fetch_one(self.pools.write_pool())
        .await
        .map_meta_err(DatabaseOperation::Query {
            description: "statuses.save".to_string(),
        }, None)?;
        Status::try_from(row).map_err(crate::error::MetaDataError::Other)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        sqlx::query("DELETE FROM statuses WHERE id = $1")
            .bind(id)
            .execute(self.pools.write_pool())
            .await
            .map_meta_err(DatabaseOperation::Query {
                description: "statuses.delete".to_string(),
            }, None)?;
        Ok(())
    }
}

/// Bind a JSON value onto a `query_as` builder (mirrors [`bind_value`] for
/// the `sqlx::query::QueryAs` type, which `query_as` returns instead of
/// plain `Query`).
fn bind_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    value: &'q serde_json::Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    match value {
        serde_json::Value::String(s) => q.bind(s.as_str()),
        serde_json::Value::Number(n) if n.is_i64() => q.bind(n.as_i64()),
        serde_json::Value::Number(n) if n.is_u64() => q.bind(n.as_u64().map(|u| u as i64)),
        serde_json::Value::Number(n) => q.bind(n.as_f64()),
        serde_json::Value::Bool(b) => q.bind(*b),
        serde_json::Value::Null => q.bind(Option::<String>::None),
        other => q.bind(other.to_string()),
    }
}
