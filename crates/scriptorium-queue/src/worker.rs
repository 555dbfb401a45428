//! The worker loop: lease, dispatch to the registered handler, classify the
//! result, Ack/Nack or give up.
//!
//! A single `run_once` pass is the unit the integration tests drive; the
//! long-running service just calls it on an interval. Keeping the loop body
//! out of a `loop {}` here means tests don't need to race a background task
//! to observe one iteration's effect.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::TaskError;
use crate::queue::{Leased, TaskQueue};
use crate::registry::HandlerRegistry;

pub struct WorkerConfig {
    pub batch_size: i64,
    pub lease_seconds: i64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            lease_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Acked,
    Retried,
    Failed,
}

/// Leases up to one batch of ready tasks and drives each to completion.
/// Returns one outcome per task leased this pass (empty if the queue had
/// nothing ready).
pub async fn run_once(
    queue: &dyn TaskQueue,
    registry: &HandlerRegistry,
    config: &WorkerConfig,
    cancellation: CancellationToken,
) -> Result<Vec<TaskOutcome>, TaskError> {
    let leased = queue.lease(config.batch_size, config.lease_seconds).await?;
    let mut outcomes = Vec::with_capacity(leased.len());

    for Leased { task, lease_token } in leased {
        if cancellation.is_cancelled() {
            queue.nack(task.id, lease_token).await?;
            break;
        }

        let Some(handler) = registry.get(&task.operation) else {
            warn!(operation = %task.operation, task_id = task.id, "no handler registered");
            queue.nack(task.id, lease_token).await?;
            outcomes.push(TaskOutcome::Failed);
            continue;
        };

        let result = handler
            .execute(cancellation.child_token(), task.payload.clone())
            .await;

        match result {
            Ok(()) => {
                queue.ack(task.id, lease_token).await?;
                outcomes.push(TaskOutcome::Acked);
            }
            Err(err) if err.is_retryable() && task.attempts + 1 < task.max_retries => {
                warn!(task_id = task.id, error = %err, "task failed, will retry");
                queue.nack(task.id, lease_token).await?;
                outcomes.push(TaskOutcome::Retried);
            }
            Err(err) => {
                warn!(task_id = task.id, error = %err, "task failed permanently");
                queue.ack(task.id, lease_token).await?;
                outcomes.push(TaskOutcome::Failed);
            }
        }
    }

    if !outcomes.is_empty() {
        info!(count = outcomes.len(), "worker pass completed");
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{MockTaskQueue, NewTask};
    use async_trait::async_trait;
    use serde_json::json;

    struct AlwaysOk;
    #[async_trait]
    impl crate::registry::Handler for AlwaysOk {
        async fn execute(
            &self,
            _cancellation: CancellationToken,
            _payload: serde_json::Value,
        ) -> Result<(), TaskError> {
            Ok(())
        }
    }

    struct AlwaysTransient;
    #[async_trait]
    impl crate::registry::Handler for AlwaysTransient {
        async fn execute(
            &self,
            _cancellation: CancellationToken,
            _payload: serde_json::Value,
        ) -> Result<(), TaskError> {
            Err(TaskError::Transient("upstream timeout".to_string()))
        }
    }

    struct AlwaysPermanent;
    #[async_trait]
    impl crate::registry::Handler for AlwaysPermanent {
        async fn execute(
            &self,
            _cancellation: CancellationToken,
            _payload: serde_json::Value,
        ) -> Result<(), TaskError> {
            Err(TaskError::NoHandler("bad.op".to_string()))
        }
    }

    fn task(operation: &str) -> NewTask {
        NewTask {
            operation: operation.to_string(),
            payload: json!({}),
            priority: 2000,
            trackable_type: "Commit".to_string(),
            trackable_id: 1,
            max_retries: 3,
        }
    }

    #[tokio::test]
    async fn successful_handler_acks_the_task() {
        let queue = MockTaskQueue::new();
        queue.enqueue(task("succeed")).await.unwrap();
        let registry = HandlerRegistry::new();
        registry.register("succeed", Arc::new(AlwaysOk));

        let outcomes = run_once(
            &queue,
            &registry,
            &WorkerConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcomes, vec![TaskOutcome::Acked]);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn transient_failure_under_retry_budget_is_retried() {
        let queue = MockTaskQueue::new();
        queue.enqueue(task("flaky")).await.unwrap();
        let registry = HandlerRegistry::new();
        registry.register("flaky", Arc::new(AlwaysTransient));

        let outcomes = run_once(
            &queue,
            &registry,
            &WorkerConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcomes, vec![TaskOutcome::Retried]);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn permanent_failure_is_acked_as_failed() {
        let queue = MockTaskQueue::new();
        queue.enqueue(task("doomed")).await.unwrap();
        let registry = HandlerRegistry::new();
        registry.register("doomed", Arc::new(AlwaysPermanent));

        let outcomes = run_once(
            &queue,
            &registry,
            &WorkerConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcomes, vec![TaskOutcome::Failed]);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn unregistered_operation_is_treated_as_failed() {
        let queue = MockTaskQueue::new();
        queue.enqueue(task("nobody.handles.this")).await.unwrap();
        let registry = HandlerRegistry::new();

        let outcomes = run_once(
            &queue,
            &registry,
            &WorkerConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcomes, vec![TaskOutcome::Failed]);
    }
}
