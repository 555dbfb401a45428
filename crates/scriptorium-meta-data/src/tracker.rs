//! Per-operation progress/state lifecycle
//!
//! `TrackerFactory::for_operation` hands out a [`Tracker`] scoped to one
//! `(operation, trackable_type, trackable_id)` triple. Every `Tracker`
//! method persists a `Status` row (insert-or-update) and never propagates
//! a persistence failure to the caller — it logs a warning and swallows
//! it, per "Tracker calls must never cause handler failure."

use std::sync::Arc;

use crate::entities::models::{Status, StatusState};
use crate::entities::traits::StatusStore;
use crate::query::{Cond, Query};

/// The scope dimension on a `Status` row beyond `TrackerFactory`'s own key;
/// reserved for future multi-scope tracking, fixed to this value today.
const DEFAULT_SCOPE: &str = "default";

/// Hands out [`Tracker`]s scoped to one `(operation, trackable_type,
/// trackable_id)` triple, backed by a shared `StatusStore`.
pub trait TrackerFactory: Send + Sync {
    fn for_operation(&self, operation: &str, trackable_type: &str, trackable_id: i64) -> Tracker;
}

/// A Postgres-backed `TrackerFactory`.
pub struct PgTrackerFactory {
    statuses: Arc<dyn StatusStore>,
}

impl PgTrackerFactory {
    pub fn new(statuses: Arc<dyn StatusStore>) -> Self {
        Self { statuses }
    }
}

impl TrackerFactory for PgTrackerFactory {
    fn for_operation(&self, operation: &str, trackable_type: &str, trackable_id: i64) -> Tracker {
        Tracker {
            statuses: self.statuses.clone(),
            operation: operation.to_string(),
            trackable_type: trackable_type.to_string(),
            trackable_id,
        }
    }
}

/// Progress/outcome handle for one tracked operation.
///
/// Cheap to clone-by-construction (holds an `Arc<dyn StatusStore>`); a new
/// `Tracker` is produced per call to `for_operation` rather than reused.
pub struct Tracker {
    statuses: Arc<dyn StatusStore>,
    operation: String,
    trackable_type: String,
    trackable_id: i64,
}

impl Tracker {
    async fn upsert(&self, state: StatusState, current: i32, total: Option<i32>, message: Option<String>) {
        let existing = self.existing().await;
        let (id, created_at) = existing
            .as_ref()
            .map_or((0, chrono::Utc::now()), |s| (s.id, s.created_at));
        let status = Status {
            id,
            operation: self.operation.clone(),
            trackable_type: self.trackable_type.clone(),
            trackable_id: self.trackable_id,
            scope: DEFAULT_SCOPE.to_string(),
            state,
            current_count: current,
            total_count: total.or_else(|| existing.as_ref().and_then(|s| s.total_count)),
            message,
            created_at,
            updated_at: chrono::Utc::now(),
        };
        if let Err(err) = self.statuses.save(status).await {
            tracing::warn!(
                operation = %self.operation,
                trackable_type = %self.trackable_type,
                trackable_id = self.trackable_id,
                error = %err,
                "tracker write failed; continuing"
            );
        }
    }

    async fn existing(&self) -> Option<Status> {
        let query = Query::new()
            .with(Cond::eq("operation", self.operation.clone()))
            .with(Cond::eq("trackable_type", self.trackable_type.clone()))
            .with(Cond::eq("trackable_id", self.trackable_id))
            .with(Cond::eq("scope", DEFAULT_SCOPE));
        match self.statuses.find_one(&query).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(error = %err, "tracker read failed; treating as new");
                None
            }
        }
    }

    /// Set the total unit count for this operation.
    pub async fn set_total(&self, total: i32) {
        let current = self
            .existing()
            .await
            .map_or(0, |s| s.current_count);
        self.upsert(StatusState::InProgress, current, Some(total), None)
            .await;
    }

    /// Advance the current unit count, with a human-readable message.
    ///
    /// `current == total` is deliberately **not** treated as completion —
    /// callers must call [`Tracker::complete`] explicitly.
    pub async fn set_current(&self, current: i32, message: impl Into<String>) {
        self.upsert(StatusState::InProgress, current, None, Some(message.into()))
            .await;
    }

    /// Mark this operation skipped (idempotent: repeated calls just
    /// rewrite the same terminal state).
    pub async fn skip(&self, message: impl Into<String>) {
        let current = self.existing().await.map_or(0, |s| s.current_count);
        self.upsert(StatusState::Skipped, current, None, Some(message.into()))
            .await;
    }

    /// Mark this operation failed.
    pub async fn fail(&self, message: impl Into<String>) {
        let current = self.existing().await.map_or(0, |s| s.current_count);
        self.upsert(StatusState::Failed, current, None, Some(message.into()))
            .await;
    }

    /// Mark this operation successfully completed.
    pub async fn complete(&self) {
        let existing = self.existing().await;
        let current = existing
            .as_ref()
            .and_then(|s| s.total_count)
            .unwrap_or_else(|| existing.as_ref().map_or(0, |s| s.current_count));
        self.upsert(StatusState::Completed, current, None, None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::mock::MockStatusStore;

    fn factory() -> PgTrackerFactory {
        PgTrackerFactory::new(Arc::new(MockStatusStore::new()))
    }

    #[tokio::test]
    async fn set_current_does_not_complete() {
        let factory = factory();
        let tracker = factory.for_operation("enrich", "commit", 1);
        tracker.set_total(3).await;
        tracker.set_current(3, "done counting").await;

        let query = Query::new()
            .with(Cond::eq("operation", "enrich"))
            .with(Cond::eq("trackable_type", "commit"))
            .with(Cond::eq("trackable_id", 1i64))
            .with(Cond::eq("scope", DEFAULT_SCOPE));
        let status = tracker.statuses.find_one(&query).await.unwrap().unwrap();
        assert!(!status.state.is_terminal());
    }

    #[tokio::test]
    async fn complete_is_terminal_and_idempotent() {
        let factory = factory();
        let tracker = factory.for_operation("enrich", "commit", 1);
        tracker.set_total(2).await;
        tracker.complete().await;
        tracker.complete().await;

        let query = Query::new()
            .with(Cond::eq("operation", "enrich"))
            .with(Cond::eq("trackable_type", "commit"))
            .with(Cond::eq("trackable_id", 1i64))
            .with(Cond::eq("scope", DEFAULT_SCOPE));
        let status = tracker.statuses.find_one(&query).await.unwrap().unwrap();
        assert!(status.state.is_terminal());
    }

    #[tokio::test]
    async fn write_failure_never_panics_or_propagates() {
        let factory = PgTrackerFactory::new(Arc::new(MockStatusStore::new().with_failure()));
        let tracker = factory.for_operation("enrich", "commit", 1);
        tracker.set_total(1).await;
        tracker.complete().await;
    }
}
