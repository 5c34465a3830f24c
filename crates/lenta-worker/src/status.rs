//! Task-status store: three collections in a shared Redis instance.
//!
//! - `TASKS_IN_PROGRESS`: set of task ids registered by producers;
//! - `SOLVED_TASKS`: hash of task id to post id;
//! - `FALLEN_TASKS`: hash of task id to error text.
//!
//! Every operation is a single Redis command; there are no client-side
//! transactions. A worker crash between the terminal HSET and the SREM can
//! leave an id in both a terminal hash and the in-progress set, which is why
//! `status` checks the terminal collections first.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use lenta_core::models::TaskState;

use crate::QueueError;

pub const TASKS_IN_PROGRESS: &str = "TASKS_IN_PROGRESS";
pub const SOLVED_TASKS: &str = "SOLVED_TASKS";
pub const FALLEN_TASKS: &str = "FALLEN_TASKS";

/// Task lifecycle operations the producer and worker sides need. The Redis
/// store implements this; tests substitute an in-memory fake.
#[async_trait::async_trait]
pub trait StatusStore: Send + Sync {
    async fn mark_in_progress(&self, task_id: &str) -> Result<(), QueueError>;
    async fn mark_solved(&self, task_id: &str, post_id: i64) -> Result<(), QueueError>;
    async fn mark_fallen(&self, task_id: &str, error_text: &str) -> Result<(), QueueError>;
    async fn status(&self, task_id: &str) -> Result<Option<TaskState>, QueueError>;
}

#[derive(Clone)]
pub struct TaskStatusStore {
    redis: ConnectionManager,
}

impl TaskStatusStore {
    pub async fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;
        let redis = ConnectionManager::new(client)
            .await
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;
        Ok(Self { redis })
    }

    /// Reuse an existing connection manager (shared with the job queue).
    pub fn from_connection(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Register a task as in-progress (producer side, before any result).
    pub async fn mark_in_progress(&self, task_id: &str) -> Result<(), QueueError> {
        let mut conn = self.redis.clone();
        conn.sadd::<_, _, ()>(TASKS_IN_PROGRESS, task_id).await?;
        Ok(())
    }

    /// Record the terminal solved state, then drop the in-progress marker.
    pub async fn mark_solved(&self, task_id: &str, post_id: i64) -> Result<(), QueueError> {
        let mut conn = self.redis.clone();
        conn.hset::<_, _, _, ()>(SOLVED_TASKS, task_id, post_id)
            .await?;
        conn.srem::<_, _, ()>(TASKS_IN_PROGRESS, task_id).await?;
        Ok(())
    }

    /// Record the terminal failed state, then drop the in-progress marker.
    pub async fn mark_fallen(&self, task_id: &str, error_text: &str) -> Result<(), QueueError> {
        let mut conn = self.redis.clone();
        conn.hset::<_, _, _, ()>(FALLEN_TASKS, task_id, error_text)
            .await?;
        conn.srem::<_, _, ()>(TASKS_IN_PROGRESS, task_id).await?;
        Ok(())
    }

    /// Derive the task state: solved, then fallen, then in-progress.
    /// Returns `None` for ids no collection knows about.
    ///
    /// Read-only and idempotent; callers may poll freely.
    pub async fn status(&self, task_id: &str) -> Result<Option<TaskState>, QueueError> {
        let mut conn = self.redis.clone();

        let solved: Option<i64> = conn.hget(SOLVED_TASKS, task_id).await?;
        if let Some(post_id) = solved {
            return Ok(Some(TaskState::Solved { post_id }));
        }

        let fallen: Option<String> = conn.hget(FALLEN_TASKS, task_id).await?;
        if let Some(error) = fallen {
            return Ok(Some(TaskState::Fallen { error }));
        }

        let in_progress: bool = conn.sismember(TASKS_IN_PROGRESS, task_id).await?;
        if in_progress {
            return Ok(Some(TaskState::InProgress));
        }

        Ok(None)
    }
}

#[async_trait::async_trait]
impl StatusStore for TaskStatusStore {
    async fn mark_in_progress(&self, task_id: &str) -> Result<(), QueueError> {
        TaskStatusStore::mark_in_progress(self, task_id).await
    }

    async fn mark_solved(&self, task_id: &str, post_id: i64) -> Result<(), QueueError> {
        TaskStatusStore::mark_solved(self, task_id, post_id).await
    }

    async fn mark_fallen(&self, task_id: &str, error_text: &str) -> Result<(), QueueError> {
        TaskStatusStore::mark_fallen(self, task_id, error_text).await
    }

    async fn status(&self, task_id: &str) -> Result<Option<TaskState>, QueueError> {
        TaskStatusStore::status(self, task_id).await
    }
}
