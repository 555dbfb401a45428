//! Error types for the database/metadata layer
//!
//! `DatabaseError` wraps `sqlx` failures with the operation that was being
//! attempted and an optional correlation id, so a log line or API response
//! can point at exactly what failed without leaking connection strings or
//! query text. `MetaDataError` sits above it for the higher-level entity
//! stores (repositories, commits, enrichments, associations) that can fail
//! for reasons beyond a raw database error (e.g. an unknown field in a
//! query translation).

use scriptorium_common::{CommonError, CorrelationId, impl_common_conversions};
use thiserror::Error;

/// Which connection pool an operation was running against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPoolType {
    /// Pool used for inserts/updates/transactions
    Write,
    /// Pool used for point lookups and small queries
    Read,
    /// Pool used for aggregations and heavier analytical queries
    Analytics,
}

impl std::fmt::Display for ConnectionPoolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Write => "write",
            Self::Read => "read",
            Self::Analytics => "analytics",
        };
        write!(f, "{name}")
    }
}

/// Describes the database operation that was attempted, for error context
#[derive(Debug, Clone)]
pub enum DatabaseOperation {
    CountProjectBranches,
    CountIndexedFiles,
    CountChunks,
    GetDatabaseSize,
    GetLastIndexedTimestamp,
    GetFileMetadata {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    GetFilesMetadata {
        repository_id: String,
    },
    CheckFileState {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    RecordFileIndexing {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    InsertChunks {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    ReplaceFileChunks {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    GetFileChunks {
        repository_id: String,
        branch: String,
        file_path: String,
    },
    GetIndexedFiles {
        repository_id: String,
        branch: String,
    },
    EnsureProjectBranch {
        repository_id: String,
        branch: String,
    },
    GetProjectBranch {
        repository_id: String,
        branch: String,
    },
    GetProjectBranches {
        repository_id: String,
    },
    CreateIndexingJob {
        repository_id: String,
        branch: String,
    },
    UpdateJobProgress {
        job_id: uuid::Uuid,
    },
    CompleteJob {
        job_id: uuid::Uuid,
    },
    CheckRunningJobs {
        repository_id: String,
        branch: String,
    },
    Query {
        description: String,
    },
}

impl std::fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CountProjectBranches => write!(f, "count project branches"),
            Self::CountIndexedFiles => write!(f, "count indexed files"),
            Self::CountChunks => write!(f, "count chunks"),
            Self::GetDatabaseSize => write!(f, "get database size"),
            Self::GetLastIndexedTimestamp => write!(f, "get last indexed timestamp"),
            Self::GetFileMetadata {
                repository_id,
                branch,
                file_path,
            } => write!(f, "get file metadata {repository_id}@{branch}:{file_path}"),
            Self::GetFilesMetadata { repository_id } => {
                write!(f, "get files metadata for {repository_id}")
            }
            Self::CheckFileState {
                repository_id,
                branch,
                file_path,
            } => write!(f, "check file state {repository_id}@{branch}:{file_path}"),
            Self::RecordFileIndexing {
                repository_id,
                branch,
                file_path,
            } => write!(
                f,
                "record file indexing {repository_id}@{branch}:{file_path}"
            ),
            Self::InsertChunks {
                repository_id,
                branch,
                file_path,
            } => write!(f, "insert chunks {repository_id}@{branch}:{file_path}"),
            Self::ReplaceFileChunks {
                repository_id,
                branch,
                file_path,
            } => write!(
                f,
                "replace file chunks {repository_id}@{branch}:{file_path}"
            ),
            Self::GetFileChunks {
                repository_id,
                branch,
                file_path,
            } => write!(f, "get file chunks {repository_id}@{branch}:{file_path}"),
            Self::GetIndexedFiles {
                repository_id,
                branch,
            } => write!(f, "get indexed files {repository_id}@{branch}"),
            Self::EnsureProjectBranch {
                repository_id,
                branch,
            } => write!(f, "ensure project branch {repository_id}@{branch}"),
            Self::GetProjectBranch {
                repository_id,
                branch,
            } => write!(f, "get project branch {repository_id}@{branch}"),
            Self::GetProjectBranches { repository_id } => {
                write!(f, "get project branches for {repository_id}")
            }
            Self::CreateIndexingJob {
                repository_id,
                branch,
            } => write!(f, "create indexing job {repository_id}@{branch}"),
            Self::UpdateJobProgress { job_id } => write!(f, "update job progress {job_id}"),
            Self::CompleteJob { job_id } => write!(f, "complete job {job_id}"),
            Self::CheckRunningJobs {
                repository_id,
                branch,
            } => write!(f, "check running jobs {repository_id}@{branch}"),
            Self::Query { description } => write!(f, "query: {description}"),
        }
    }
}

/// Errors raised by the raw database access layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database query failed during {operation}: {source}")]
    QueryFailed {
        operation: Box<DatabaseOperation>,
        #[source]
        source: sqlx::Error,
        correlation_id: Option<CorrelationId>,
    },

    #[error("connection pool error ({pool_type}): {message}")]
    PoolError {
        pool_type: ConnectionPoolType,
        message: String,
        correlation_id: Option<CorrelationId>,
    },

    #[error("data integrity error during {operation}: {message}")]
    DataIntegrityError {
        operation: Box<DatabaseOperation>,
        message: String,
        correlation_id: Option<CorrelationId>,
    },

    #[error("unexpected database state during {operation}: {message}")]
    UnexpectedState {
        operation: Box<DatabaseOperation>,
        message: String,
        correlation_id: Option<CorrelationId>,
    },

    #[error("record not found during {operation}")]
    NotFound { operation: Box<DatabaseOperation> },

    #[error("IO error: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("database error: {0}")]
    Other(String),
}

impl CommonError for DatabaseError {
    fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl_common_conversions!(DatabaseError);

/// Result alias for the raw database layer
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Extension trait to attach a `DatabaseOperation` and correlation id to a
/// raw `sqlx::Result`, turning it into a `DatabaseResult`.
pub trait DatabaseErrorExt<T> {
    /// Map a raw `sqlx::Error` into a `DatabaseError::QueryFailed`, carrying
    /// the attempted operation and correlation id for observability.
    fn map_db_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> DatabaseResult<T>;
}

impl<T> DatabaseErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_db_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> DatabaseResult<T> {
        self.map_err(|source| DatabaseError::QueryFailed {
            operation: Box::new(operation),
            source,
            correlation_id,
        })
    }
}

/// Errors raised by the higher-level metadata/entity-store layer
///
/// Wraps `DatabaseError` and adds failures that originate above the raw
/// SQL boundary: translating a `Query` into SQL, git detection, and
/// cross-entity consistency checks (e.g. cascade delete ordering).
#[derive(Debug, Error)]
pub enum MetaDataError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("unknown field in query: {0}")]
    UnknownField(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("other error: {0}")]
    Other(String),
}

impl CommonError for MetaDataError {
    fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    fn config_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    fn other_error(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl_common_conversions!(MetaDataError);

impl From<crate::query::QueryError> for MetaDataError {
    fn from(err: crate::query::QueryError) -> Self {
        match err {
            crate::query::QueryError::UnknownField(field) => Self::UnknownField(field),
            crate::query::QueryError::UnknownParam(param) => {
                Self::Other(format!("unknown query parameter: {param}"))
            }
        }
    }
}

/// Extension trait mirroring `DatabaseErrorExt` at the `MetaDataError` level
pub trait MetaDataErrorExt<T> {
    /// Map a raw `sqlx::Error` straight into a `MetaDataError::Database`
    fn map_meta_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> MetaDataResult<T>;
}

impl<T> MetaDataErrorExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_meta_err(
        self,
        operation: DatabaseOperation,
        correlation_id: Option<CorrelationId>,
    ) -> MetaDataResult<T> {
        self.map_db_err(operation, correlation_id)
            .map_err(MetaDataError::from)
    }
}

/// Result alias for the metadata/entity-store layer
pub type MetaDataResult<T> = std::result::Result<T, MetaDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_type_display() {
        assert_eq!(ConnectionPoolType::Write.to_string(), "write");
        assert_eq!(ConnectionPoolType::Analytics.to_string(), "analytics");
    }

    #[test]
    fn operation_display_includes_context() {
        let op = DatabaseOperation::CheckFileState {
            repository_id: "github.com/acme/repo".to_string(),
            branch: "main".to_string(),
            file_path: "src/lib.rs".to_string(),
        };
        assert!(op.to_string().contains("github.com/acme/repo"));
        assert!(op.to_string().contains("src/lib.rs"));
    }

    #[test]
    fn meta_data_error_wraps_database_error() {
        let db_err = DatabaseError::UnexpectedState {
            operation: Box::new(DatabaseOperation::CountChunks),
            message: "boom".to_string(),
            correlation_id: None,
        };
        let meta_err: MetaDataError = db_err.into();
        assert!(meta_err.to_string().contains("boom"));
    }
}
