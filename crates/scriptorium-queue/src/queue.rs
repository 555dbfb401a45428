//! Durable, priority-ordered task queue over the `tasks` table.
//!
//! Leasing uses `FOR UPDATE SKIP LOCKED` so concurrent workers never block
//! on each other and never double-lease a row: each worker grabs whatever
//! the highest-priority unleased (or lease-expired) row happens to be,
//! skipping rows someone else already holds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use std::sync::Mutex;
use uuid::Uuid;

use scriptorium_meta_data::PoolManager;

use crate::error::TaskError;

#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub operation: String,
    pub payload: Value,
    pub priority: i32,
    pub trackable_type: String,
    pub trackable_id: i64,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: i32,
    pub max_retries: i32,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub operation: String,
    pub payload: Value,
    pub priority: i32,
    pub trackable_type: String,
    pub trackable_id: i64,
    pub max_retries: i32,
}

/// A leased task carries the token the worker must present to `ack`/`nack`
/// it; presenting a stale token (lease already expired and re-leased to
/// someone else) is a no-op rather than an error, so a slow worker can
/// never clobber a faster one's result.
#[derive(Debug, Clone)]
pub struct Leased {
    pub task: Task,
    pub lease_token: Uuid,
}

#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, task: NewTask) -> Result<Task, TaskError>;

    /// Leases up to `limit` ready tasks (unleased, or whose lease has
    /// expired), highest priority first, oldest-enqueued first within a
    /// priority band.
    async fn lease(&self, limit: i64, lease_seconds: i64) -> Result<Vec<Leased>, TaskError>;

    async fn ack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError>;

    /// Releases the lease and increments `attempts`. Caller decides
    /// separately whether the task has exhausted `max_retries`.
    async fn nack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError>;
}

pub struct PgTaskQueue {
    pools: PoolManager,
}

impl PgTaskQueue {
    pub const fn new(pools: PoolManager) -> Self {
        Self { pools }
    }
}

const TASK_FIELDS: &str = "id, operation, payload, priority, trackable_type, trackable_id, \
    enqueued_at, attempts, max_retries";
const TASK_FIELDS_QUALIFIED: &str = "tasks.id, tasks.operation, tasks.payload, tasks.priority, \
    tasks.trackable_type, tasks.trackable_id, tasks.enqueued_at, tasks.attempts, tasks.max_retries";

fn row_to_task(row: &sqlx::postgres::PgRow) -> Result<Task, TaskError> {
    Ok(Task {
        id: row.try_get("id").map_err(TaskError::from)?,
        operation: row.try_get("operation").map_err(TaskError::from)?,
        payload: row.try_get("payload").map_err(TaskError::from)?,
        priority: row.try_get("priority").map_err(TaskError::from)?,
        trackable_type: row.try_get("trackable_type").map_err(TaskError::from)?,
        trackable_id: row.try_get("trackable_id").map_err(TaskError::from)?,
        enqueued_at: row.try_get("enqueued_at").map_err(TaskError::from)?,
        attempts: row.try_get("attempts").map_err(TaskError::from)?,
        max_retries: row.try_get("max_retries").map_err(TaskError::from)?,
    })
}

#[async_trait]
impl TaskQueue for PgTaskQueue {
    async fn enqueue(&self, task: NewTask) -> Result<Task, TaskError> {
        let sql = format!(
            "INSERT INTO tasks (operation, payload, priority, trackable_type, trackable_id, \
             enqueued_at, attempts, max_retries) \
             VALUES ($1, $2, $3, $4, $5, now(), 0, $6) \
             RETURNING {TASK_FIELDS}"
        );
        let row = sqlx::query(&sql)
            .bind(&task.operation)
            .bind(&task.payload)
            .bind(task.priority)
            .bind(&task.trackable_type)
            .bind(task.trackable_id)
            .bind(task.max_retries)
            .fetch_one(self.pools.write_pool())
            .await?;
        row_to_task(&row)
    }

    async fn lease(&self, limit: i64, lease_seconds: i64) -> Result<Vec<Leased>, TaskError> {
        let sql = format!(
            "WITH ready AS ( \
                SELECT id FROM tasks \
                WHERE leased_until IS NULL OR leased_until < now() \
                ORDER BY priority DESC, enqueued_at ASC \
                LIMIT $1 \
                FOR UPDATE SKIP LOCKED \
             ) \
             UPDATE tasks SET leased_until = now() + make_interval(secs => $2), \
                 lease_token = gen_random_uuid() \
             FROM ready WHERE tasks.id = ready.id \
             RETURNING {TASK_FIELDS_QUALIFIED}, tasks.lease_token"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(lease_seconds as f64)
            .fetch_all(self.pools.write_pool())
            .await?;
        rows.iter()
            .map(|row| {
                let task = row_to_task(row)?;
                let lease_token: Uuid = row.try_get("lease_token").map_err(TaskError::from)?;
                Ok(Leased { task, lease_token })
            })
            .collect()
    }

    async fn ack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1 AND lease_token = $2")
            .bind(task_id)
            .bind(lease_token)
            .execute(self.pools.write_pool())
            .await?;
        Ok(())
    }

    async fn nack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError> {
        sqlx::query(
            "UPDATE tasks SET leased_until = NULL, lease_token = NULL, attempts = attempts + 1 \
             WHERE id = $1 AND lease_token = $2",
        )
        .bind(task_id)
        .bind(lease_token)
        .execute(self.pools.write_pool())
        .await?;
        Ok(())
    }
}

/// In-memory queue for handler/worker unit tests. Not thread-fair, not
/// crash-durable — purely a stand-in for `PgTaskQueue`'s interface.
pub struct MockTaskQueue {
    tasks: Mutex<Vec<(Task, Option<Uuid>)>>,
    next_id: Mutex<i64>,
}

impl Default for MockTaskQueue {
    fn default() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }
}

impl MockTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaskQueue for MockTaskQueue {
    async fn enqueue(&self, task: NewTask) -> Result<Task, TaskError> {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;
        let task = Task {
            id,
            operation: task.operation,
            payload: task.payload,
            priority: task.priority,
            trackable_type: task.trackable_type,
            trackable_id: task.trackable_id,
            enqueued_at: Utc::now(),
            attempts: 0,
            max_retries: task.max_retries,
        };
        self.tasks.lock().unwrap().push((task.clone(), None));
        Ok(task)
    }

    async fn lease(&self, limit: i64, _lease_seconds: i64) -> Result<Vec<Leased>, TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        let mut candidates: Vec<usize> = tasks
            .iter()
            .enumerate()
            .filter(|(_, (_, lease))| lease.is_none())
            .map(|(i, _)| i)
            .collect();
        candidates.sort_by(|&a, &b| {
            tasks[b]
                .0
                .priority
                .cmp(&tasks[a].0.priority)
                .then(tasks[a].0.enqueued_at.cmp(&tasks[b].0.enqueued_at))
        });
        candidates.truncate(limit.max(0) as usize);

        let mut leased = Vec::new();
        for idx in candidates {
            let token = Uuid::new_v4();
            tasks[idx].1 = Some(token);
            leased.push(Leased {
                task: tasks[idx].0.clone(),
                lease_token: token,
            });
        }
        Ok(leased)
    }

    async fn ack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|(t, lease)| !(t.id == task_id && *lease == Some(lease_token)));
        Ok(())
    }

    async fn nack(&self, task_id: i64, lease_token: Uuid) -> Result<(), TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        for (t, lease) in tasks.iter_mut() {
            if t.id == task_id && *lease == Some(lease_token) {
                *lease = None;
                t.attempts += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_task(priority: i32) -> NewTask {
        NewTask {
            operation: "enrich.commit_description".to_string(),
            payload: json!({ "commit_id": 1 }),
            priority,
            trackable_type: "Commit".to_string(),
            trackable_id: 1,
            max_retries: 5,
        }
    }

    #[tokio::test]
    async fn lease_orders_by_priority_then_age() {
        let queue = MockTaskQueue::new();
        queue.enqueue(sample_task(1000)).await.unwrap();
        queue.enqueue(sample_task(5000)).await.unwrap();
        queue.enqueue(sample_task(2000)).await.unwrap();

        let leased = queue.lease(10, 60).await.unwrap();
        let priorities: Vec<i32> = leased.iter().map(|l| l.task.priority).collect();
        assert_eq!(priorities, vec![5000, 2000, 1000]);
    }

    #[tokio::test]
    async fn ack_removes_task_and_nack_clears_lease() {
        let queue = MockTaskQueue::new();
        queue.enqueue(sample_task(2000)).await.unwrap();

        let leased = queue.lease(1, 60).await.unwrap();
        let leased = &leased[0];

        queue.nack(leased.task.id, leased.lease_token).await.unwrap();
        assert_eq!(queue.len(), 1);

        let re_leased = queue.lease(1, 60).await.unwrap();
        assert_eq!(re_leased[0].task.attempts, 1);

        queue.ack(re_leased[0].task.id, re_leased[0].lease_token).await.unwrap();
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn leased_task_is_not_leased_again() {
        let queue = MockTaskQueue::new();
        queue.enqueue(sample_task(2000)).await.unwrap();
        let first = queue.lease(10, 60).await.unwrap();
        assert_eq!(first.len(), 1);
        let second = queue.lease(10, 60).await.unwrap();
        assert!(second.is_empty());
    }
}
