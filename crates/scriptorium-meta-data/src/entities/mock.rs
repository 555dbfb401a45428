//! In-memory store doubles for handler unit tests
//!
//! Mirrors `scriptorium_vector_data::storage::mock::MockStorage`: a
//! `Mutex`-guarded `Vec` per entity, `with_*_failure` builders to exercise
//! error paths, and plain `Vec` scans instead of SQL for condition
//! matching — fine at test scale, and it keeps the mocks independent of
//! the `QueryTranslator` SQL fragment logic under test elsewhere.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{MetaDataError, MetaDataResult};
use crate::query::{Cond, Query};

use super::models::{Association, Commit, Enrichment, File, Repository, Status};
use super::traits::{
    AssociationStore, CommitStore, EnrichmentStore, FileStore, RepositoryStore, StatusStore,
};

fn matches(cond: &Cond, actual: &Value) -> bool {
    if cond.in_list {
        cond.values.iter().any(|v| v == actual)
    } else {
        cond.values.first() == Some(actual)
    }
}

fn next_id(counter: &Mutex<i64>) -> i64 {
    let mut guard = counter.lock().unwrap();
    *guard += 1;
    *guard
}

/// In-memory `RepositoryStore`.
#[derive(Default)]
pub struct MockRepositoryStore {
    rows: Mutex<Vec<Repository>>,
    next_id: Mutex<i64>,
    fail: bool,
}

impl MockRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call return an error, to exercise handler error paths.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other("mock repository store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryStore for MockRepositoryStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Repository>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| {
                query.conditions().iter().all(|cond| match cond.field {
                    "id" => matches(cond, &Value::from(r.id)),
                    "remote_url" => matches(cond, &Value::from(r.remote_url.clone())),
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Repository>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_remote_url(&self, remote_url: &str) -> MetaDataResult<Option<Repository>> {
        self.check_fail()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.remote_url == remote_url)
            .cloned())
    }

    async fn save(&self, mut repository: Repository) -> MetaDataResult<Repository> {
        self.check_fail()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|r| r.remote_url == repository.remote_url) {
            repository.id = existing.id;
            *existing = repository.clone();
        } else {
            repository.id = next_id(&self.next_id);
            rows.push(repository.clone());
        }
        Ok(repository)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        Ok(self.find(query).await?.len() as i64)
    }
}

/// In-memory `CommitStore`.
#[derive(Default)]
pub struct MockCommitStore {
    rows: Mutex<Vec<Commit>>,
    fail: bool,
}

impl MockCommitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other("mock commit store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CommitStore for MockCommitStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Commit>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|c| {
                query.conditions().iter().all(|cond| match cond.field {
                    "repo_id" => matches(cond, &Value::from(c.repo_id)),
                    "sha" => matches(cond, &Value::from(c.sha.clone())),
                    "parent_sha" => match &c.parent_sha {
                        Some(p) => matches(cond, &Value::from(p.clone())),
                        None => false,
                    },
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Commit>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_sha(&self, repo_id: i64, sha: &str) -> MetaDataResult<Option<Commit>> {
        self.check_fail()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.repo_id == repo_id && c.sha == sha)
            .cloned())
    }

    async fn save(&self, commit: Commit) -> MetaDataResult<Commit> {
        self.check_fail()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows
            .iter_mut()
            .find(|c| c.repo_id == commit.repo_id && c.sha == commit.sha)
        {
            *existing = commit.clone();
        } else {
            rows.push(commit.clone());
        }
        Ok(commit)
    }

    async fn delete(&self, repo_id: i64, sha: &str) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows
            .lock()
            .unwrap()
            .retain(|c| !(c.repo_id == repo_id && c.sha == sha));
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        Ok(self.find(query).await?.len() as i64)
    }
}

/// In-memory `FileStore`.
#[derive(Default)]
pub struct MockFileStore {
    rows: Mutex<Vec<File>>,
    next_id: Mutex<i64>,
    fail: bool,
}

impl MockFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other("mock file store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for MockFileStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<File>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|f| {
                query.conditions().iter().all(|cond| match cond.field {
                    "id" => matches(cond, &Value::from(f.id)),
                    "repo_id" => matches(cond, &Value::from(f.repo_id)),
                    "commit_sha" => matches(cond, &Value::from(f.commit_sha.clone())),
                    "path" => matches(cond, &Value::from(f.path.clone())),
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<File>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_for_commit(&self, repo_id: i64, commit_sha: &str) -> MetaDataResult<Vec<File>> {
        self.check_fail()?;
        let mut files: Vec<File> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.repo_id == repo_id && f.commit_sha == commit_sha)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    async fn save(&self, mut file: File) -> MetaDataResult<File> {
        self.check_fail()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|f| {
            f.repo_id == file.repo_id && f.commit_sha == file.commit_sha && f.path == file.path
        }) {
            file.id = existing.id;
            *existing = file.clone();
        } else {
            file.id = next_id(&self.next_id);
            rows.push(file.clone());
        }
        Ok(file)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        Ok(self.find(query).await?.len() as i64)
    }
}

/// In-memory `EnrichmentStore`, including chunk ranges and cascade delete.
#[derive(Default)]
pub struct MockEnrichmentStore {
    rows: Mutex<Vec<Enrichment>>,
    chunk_ranges: Mutex<Vec<(i64, i32, i32)>>,
    next_id: Mutex<i64>,
    fail: bool,
}

impl MockEnrichmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other(
                "mock enrichment store failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrichmentStore for MockEnrichmentStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Enrichment>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|e| {
                query.conditions().iter().all(|cond| match cond.field {
                    "id" => matches(cond, &Value::from(e.id)),
                    "enrichment_type" => matches(cond, &Value::from(e.enrichment_type.as_str())),
                    "subtype" => matches(cond, &Value::from(e.subtype.clone())),
                    "entity_key" => matches(cond, &Value::from(e.entity_key.clone())),
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Enrichment>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_for_commit(
        &self,
        enrichment_type: &str,
        subtype: &str,
        _repo_id: i64,
        _commit_sha: &str,
    ) -> MetaDataResult<Vec<Enrichment>> {
        self.check_fail()?;
        let mut rows: Vec<Enrichment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.enrichment_type.as_str() == enrichment_type && e.subtype == subtype)
            .cloned()
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    async fn save(&self, mut enrichment: Enrichment) -> MetaDataResult<Enrichment> {
        self.check_fail()?;
        enrichment.id = next_id(&self.next_id);
        self.rows.lock().unwrap().push(enrichment.clone());
        Ok(enrichment)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }

    async fn delete_by(&self, query: &Query) -> MetaDataResult<u64> {
        self.check_fail()?;
        let matching = self.find(query).await?;
        let ids: Vec<i64> = matching.iter().map(|e| e.id).collect();
        self.rows.lock().unwrap().retain(|e| !ids.contains(&e.id));
        Ok(ids.len() as u64)
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        Ok(self.find(query).await?.len() as i64)
    }

    async fn save_chunk_range(
        &self,
        enrichment_id: i64,
        start_line: i32,
        end_line: i32,
    ) -> MetaDataResult<()> {
        self.check_fail()?;
        let mut ranges = self.chunk_ranges.lock().unwrap();
        ranges.retain(|(id, _, _)| *id != enrichment_id);
        ranges.push((enrichment_id, start_line, end_line));
        Ok(())
    }

    async fn delete_repository_cascade(&self, _repo_id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().clear();
        self.chunk_ranges.lock().unwrap().clear();
        Ok(())
    }
}

/// In-memory `AssociationStore`.
#[derive(Default)]
pub struct MockAssociationStore {
    rows: Mutex<Vec<Association>>,
    next_id: Mutex<i64>,
    fail: bool,
}

impl MockAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other(
                "mock association store failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AssociationStore for MockAssociationStore {
    async fn find(&self, query: &Query) -> MetaDataResult<Vec<Association>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|a| {
                query.conditions().iter().all(|cond| match cond.field {
                    "id" => matches(cond, &Value::from(a.id)),
                    "enrichment_id" => matches(cond, &Value::from(a.enrichment_id)),
                    "entity_id" => matches(cond, &Value::from(a.entity_id)),
                    "entity_type" => matches(cond, &Value::from(a.entity_type.as_str())),
                    _ => true,
                })
            })
            .cloned()
            .collect())
    }

    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Association>> {
        Ok(self.find(query).await?.into_iter().next())
    }

    async fn find_by_entity_type(
        &self,
        enrichment_id: i64,
        entity_type: &str,
    ) -> MetaDataResult<Option<Association>> {
        self.check_fail()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.enrichment_id == enrichment_id && a.entity_type.as_str() == entity_type)
            .cloned())
    }

    async fn save(&self, mut association: Association) -> MetaDataResult<Association> {
        self.check_fail()?;
        association.id = next_id(&self.next_id);
        self.rows.lock().unwrap().push(association.clone());
        Ok(association)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn count(&self, query: &Query) -> MetaDataResult<i64> {
        Ok(self.find(query).await?.len() as i64)
    }
}

/// In-memory `StatusStore`.
#[derive(Default)]
pub struct MockStatusStore {
    rows: Mutex<Vec<Status>>,
    next_id: Mutex<i64>,
    fail: bool,
}

impl MockStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    fn check_fail(&self) -> MetaDataResult<()> {
        if self.fail {
            return Err(MetaDataError::Other("mock status store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StatusStore for MockStatusStore {
    async fn find_one(&self, query: &Query) -> MetaDataResult<Option<Status>> {
        self.check_fail()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|s| {
                query.conditions().iter().all(|cond| match cond.field {
                    "id" => matches(cond, &Value::from(s.id)),
                    "operation" => matches(cond, &Value::from(s.operation.clone())),
                    "trackable_type" => matches(cond, &Value::from(s.trackable_type.clone())),
                    "trackable_id" => matches(cond, &Value::from(s.trackable_id)),
                    "scope" => matches(cond, &Value::from(s.scope.clone())),
                    _ => true,
                })
            })
            .cloned())
    }

    async fn save(&self, mut status: Status) -> MetaDataResult<Status> {
        self.check_fail()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|s| {
            s.operation == status.operation
                && s.trackable_type == status.trackable_type
                && s.trackable_id == status.trackable_id
                && s.scope == status.scope
        }) {
            status.id = existing.id;
            *existing = status.clone();
        } else {
            status.id = next_id(&self.next_id);
            rows.push(status.clone());
        }
        Ok(status)
    }

    async fn delete(&self, id: i64) -> MetaDataResult<()> {
        self.check_fail()?;
        self.rows.lock().unwrap().retain(|s| s.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::models::{EntityType, EnrichmentType, StatusState};

    #[tokio::test]
    async fn repository_save_upserts_by_remote_url() {
        let store = MockRepositoryStore::new();
        let repo = Repository {
            id: 0,
            remote_url: "https://example.com/a.git".to_string(),
            working_copy: None,
            tracking: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let saved = store.save(repo.clone()).await.unwrap();
        let saved_again = store.save(repo).await.unwrap();
        assert_eq!(saved.id, saved_again.id);
        assert_eq!(store.count(&Query::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn failure_mode_propagates() {
        let store = MockCommitStore::new().with_failure();
        assert!(store.find(&Query::new()).await.is_err());
    }

    #[tokio::test]
    async fn enrichment_find_for_commit_orders_by_id() {
        let store = MockEnrichmentStore::new();
        for _ in 0..3 {
            store
                .save(Enrichment {
                    id: 0,
                    enrichment_type: EnrichmentType::Usage,
                    subtype: "snippet".to_string(),
                    entity_key: "k".to_string(),
                    content: "c".to_string(),
                    language: None,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }
        let found = store
            .find_for_commit("usage", "snippet", 1, "deadbeef")
            .await
            .unwrap();
        let ids: Vec<i64> = found.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn association_find_by_entity_type() {
        let store = MockAssociationStore::new();
        store
            .save(Association {
                id: 0,
                enrichment_id: 1,
                entity_id: 42,
                entity_type: EntityType::Snippet,
            })
            .await
            .unwrap();
        let found = store.find_by_entity_type(1, "snippet").await.unwrap();
        assert_eq!(found.unwrap().entity_id, 42);
    }

    #[tokio::test]
    async fn status_save_upserts_by_key() {
        let store = MockStatusStore::new();
        let status = Status {
            id: 0,
            operation: "enrich".to_string(),
            trackable_type: "commit".to_string(),
            trackable_id: 1,
            scope: "repo:1".to_string(),
            state: StatusState::Started,
            current_count: 0,
            total_count: None,
            message: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        store.save(status.clone()).await.unwrap();
        let mut updated = status.clone();
        updated.state = StatusState::Completed;
        let saved = store.save(updated).await.unwrap();
        let query = Query::new().with(Cond::eq("operation", "enrich"));
        let found = store.find_one(&query).await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert!(found.state.is_terminal());
    }
}
