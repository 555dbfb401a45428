//! Entity row types for the commit-enrichment data model
//!
//! Mirrors the shape of `crate::models::{ProjectBranch, IndexedFile, ...}`
//! (one `sqlx::FromRow` struct per entity, `Uuid`/`i64` ids, `chrono`
//! timestamps) but for the spec's Repository/Commit/File/Enrichment/
//! Association/Status entities rather than the legacy file-indexing ones.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Where a repository's working copy lives, once cloned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCopy {
    pub local_path: PathBuf,
    pub remote: String,
}

/// What ref a repository tracks. Branch takes priority when more than one
/// is somehow set (`Repository::resolve_ref`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tracking {
    Branch(String),
    Tag(String),
    Commit(String),
}

/// A tracked git repository.
///
/// Identified by monotonic `id` and unique `remote_url`. `working_copy` is
/// filled in by the clone handler; `tracking` is mutated only by
/// configuration calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub remote_url: String,
    pub working_copy: Option<WorkingCopy>,
    pub tracking: Option<Tracking>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repository {
    /// Resolve the ref this repository tracks, preferring branch over tag
    /// over commit when more than one tracking value is somehow set.
    pub fn resolve_ref(&self) -> Option<&str> {
        match &self.tracking {
            Some(Tracking::Branch(b)) => Some(b.as_str()),
            Some(Tracking::Tag(t)) => Some(t.as_str()),
            Some(Tracking::Commit(c)) => Some(c.as_str()),
            None => None,
        }
    }
}

/// A single row as read back from `repositories` before `working_copy`/
/// `tracking` are reassembled from their flattened columns.
#[derive(Debug, FromRow)]
pub(crate) struct RepositoryRow {
    pub id: i64,
    pub remote_url: String,
    pub local_path: Option<String>,
    pub working_copy_remote: Option<String>,
    pub tracking_kind: Option<String>,
    pub tracking_value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RepositoryRow> for Repository {
    fn from(row: RepositoryRow) -> Self {
        let working_copy = match (row.local_path, row.working_copy_remote) {
            (Some(local_path), Some(remote)) => Some(WorkingCopy {
                local_path: PathBuf::from(local_path),
                remote,
            }),
            _ => None,
        };
        let tracking = match (row.tracking_kind.as_deref(), row.tracking_value) {
            (Some("branch"), Some(v)) => Some(Tracking::Branch(v)),
            (Some("tag"), Some(v)) => Some(Tracking::Tag(v)),
            (Some("commit"), Some(v)) => Some(Tracking::Commit(v)),
            _ => None,
        };
        Self {
            id: row.id,
            remote_url: row.remote_url,
            working_copy,
            tracking,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An immutable commit, keyed by `(repo_id, sha)`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Commit {
    pub repo_id: i64,
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub committer_name: String,
    pub committer_email: String,
    pub authored_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub parent_sha: Option<String>,
}

/// A file attached to a commit by sha. `id` is internal, used only for
/// associations.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub repo_id: i64,
    pub commit_sha: String,
    pub path: String,
    pub blob_sha: String,
    pub size: i64,
    pub extension: Option<String>,
    pub language: Option<String>,
    pub mime_type: Option<String>,
}

/// The enrichment type taxonomy (see glossary for subtype meanings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentType {
    Architecture,
    Development,
    History,
    Usage,
}

impl EnrichmentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Development => "development",
            Self::History => "history",
            Self::Usage => "usage",
        }
    }
}

impl std::str::FromStr for EnrichmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architecture" => Ok(Self::Architecture),
            "development" => Ok(Self::Development),
            "history" => Ok(Self::History),
            "usage" => Ok(Self::Usage),
            other => Err(format!("unknown enrichment type: {other}")),
        }
    }
}

/// The central value object: a piece of LLM- or slicer-produced content
/// attached to the commit graph via [`Association`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrichment {
    pub id: i64,
    pub enrichment_type: EnrichmentType,
    pub subtype: String,
    pub entity_key: String,
    pub content: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct EnrichmentRow {
    pub id: i64,
    pub enrichment_type: String,
    pub subtype: String,
    pub entity_key: String,
    pub content: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EnrichmentRow> for Enrichment {
    type Error = String;

    fn try_from(row: EnrichmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            enrichment_type: row.enrichment_type.parse()?,
            subtype: row.subtype,
            entity_key: row.entity_key,
            content: row.content,
            language: row.language,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// What kind of entity an association's `entity_id` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Commit,
    Snippet,
    File,
    Repository,
}

impl EntityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Snippet => "snippet",
            Self::File => "file",
            Self::Repository => "repository",
        }
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => Ok(Self::Commit),
            "snippet" => Ok(Self::Snippet),
            "file" => Ok(Self::File),
            "repository" => Ok(Self::Repository),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}

/// Links an enrichment to an entity it decorates or derives from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub id: i64,
    pub enrichment_id: i64,
    pub entity_id: i64,
    pub entity_type: EntityType,
}

#[derive(Debug, FromRow)]
pub(crate) struct AssociationRow {
    pub id: i64,
    pub enrichment_id: i64,
    pub entity_id: i64,
    pub entity_type: String,
}

impl TryFrom<AssociationRow> for Association {
    type Error = String;

    fn try_from(row: AssociationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            enrichment_id: row.enrichment_id,
            entity_id: row.entity_id,
            entity_type: row.entity_type.parse()?,
        })
    }
}

/// Progress/outcome state for one `(operation, trackable_type,
/// trackable_id, scope)` tuple. Terminal states are `Completed`, `Failed`,
/// `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Started,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl StatusState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

impl std::str::FromStr for StatusState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "skipped" => Ok(Self::Skipped),
            other => Err(format!("unknown status state: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub operation: String,
    pub trackable_type: String,
    pub trackable_id: i64,
    pub scope: String,
    pub state: StatusState,
    pub current_count: i32,
    pub total_count: Option<i32>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub(crate) struct StatusRow {
    pub id: i64,
    pub operation: String,
    pub trackable_type: String,
    pub trackable_id: i64,
    pub scope: String,
    pub state: String,
    pub current_count: i32,
    pub total_count: Option<i32>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<StatusRow> for Status {
    type Error = String;

    fn try_from(row: StatusRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            operation: row.operation,
            trackable_type: row.trackable_type,
            trackable_id: row.trackable_id,
            scope: row.scope,
            state: row.state.parse()?,
            current_count: row.current_count,
            total_count: row.total_count,
            message: row.message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
