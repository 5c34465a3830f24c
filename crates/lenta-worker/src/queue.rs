//! Job queue: serde_json jobs on a Redis list, plus the worker loop.
//!
//! Two execution modes implement the same `enqueue -> JobHandle` contract:
//!
//! - **Deferred** (production): LPUSH onto the list; a `WorkerLoop` in one or
//!   more worker processes BRPOPs jobs off the other end. Redis pop atomicity
//!   guarantees each job reaches exactly one consumer.
//! - **Inline** (tests, degraded single-process deployments): the enqueue call
//!   runs the job to completion and the handle carries the result.
//!
//! Callers must treat both handle shapes as valid.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};

use lenta_core::models::{PostDraft, WorkerResult};

use crate::QueueError;

/// Redis list holding serialized pending jobs.
pub const JOB_QUEUE_KEY: &str = "POST_JOBS";

const DEQUEUE_TIMEOUT_SECS: u64 = 1;

/// One unit of asynchronous post-creation work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostJob {
    pub task_id: String,
    pub user_id: i64,
    pub draft: PostDraft,
}

/// What `enqueue` hands back. `inline_result` is present only when the queue
/// executed the job before returning.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub task_id: String,
    pub inline_result: Option<WorkerResult>,
}

/// Consumer side of the queue. The ingest worker implements this; tests
/// substitute stubs.
#[async_trait::async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: &PostJob) -> WorkerResult;
}

enum QueueInner {
    Deferred { redis: ConnectionManager },
    Inline { runner: Arc<dyn JobRunner> },
}

pub struct JobQueue {
    inner: QueueInner,
}

impl JobQueue {
    /// Deferred queue over an existing Redis connection.
    pub fn deferred(redis: ConnectionManager) -> Self {
        Self {
            inner: QueueInner::Deferred { redis },
        }
    }

    /// Inline queue: jobs run inside `enqueue` on the given runner.
    pub fn inline(runner: Arc<dyn JobRunner>) -> Self {
        Self {
            inner: QueueInner::Inline { runner },
        }
    }

    /// Submit a job. Depending on the execution mode the job either lands on
    /// the Redis list for a worker loop, or runs right here.
    #[tracing::instrument(skip(self, job), fields(task_id = %job.task_id, user_id = job.user_id))]
    pub async fn enqueue(&self, job: PostJob) -> Result<JobHandle, QueueError> {
        match &self.inner {
            QueueInner::Deferred { redis } => {
                let serialized = serde_json::to_string(&job)?;
                let mut conn = redis.clone();
                conn.lpush::<_, _, ()>(JOB_QUEUE_KEY, serialized).await?;
                tracing::debug!("job enqueued for deferred execution");
                Ok(JobHandle {
                    task_id: job.task_id,
                    inline_result: None,
                })
            }
            QueueInner::Inline { runner } => {
                let result = runner.run(&job).await;
                tracing::debug!("job executed inline at enqueue time");
                Ok(JobHandle {
                    task_id: job.task_id,
                    inline_result: Some(result),
                })
            }
        }
    }
}

/// Deferred-mode consumer: pops jobs off the Redis list and dispatches them
/// to the runner with bounded concurrency.
pub struct WorkerLoop {
    redis: ConnectionManager,
    runner: Arc<dyn JobRunner>,
    concurrency: usize,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl WorkerLoop {
    pub fn new(redis: ConnectionManager, runner: Arc<dyn JobRunner>, concurrency: usize) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Self {
            redis,
            runner,
            concurrency,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Handle for asking the loop to stop after the current dequeue attempt.
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run until a shutdown signal arrives. Jobs run on spawned tasks; a
    /// semaphore permit is claimed before each dequeue so at most
    /// `concurrency` jobs are in flight.
    ///
    /// The shutdown check happens between iterations, never racing the
    /// dequeue: BRPOP over the multiplexed connection is not
    /// cancellation-safe, and dropping it mid-reply would discard a job Redis
    /// has already popped. Each dequeue is awaited to completion, so a popped
    /// job is always dispatched; the BRPOP timeout bounds shutdown latency.
    pub async fn run(mut self) {
        tracing::info!(concurrency = self.concurrency, "worker loop started");
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            if Self::shutdown_requested(&mut self.shutdown_rx) {
                tracing::info!("worker loop shutting down");
                break;
            }

            match Self::dequeue(self.redis.clone()).await {
                Ok(Some(job)) => {
                    let runner = Arc::clone(&self.runner);
                    tokio::spawn(async move {
                        let _permit = permit;
                        runner.run(&job).await;
                    });
                }
                Ok(None) => {
                    // timed out with an empty list; loop around
                    drop(permit);
                }
                Err(e) => {
                    drop(permit);
                    tracing::error!(error = %e, "dequeue failed, backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        tracing::info!("worker loop stopped");
    }

    /// Non-blocking: a pending signal (or a fully closed channel) stops the
    /// loop, an empty channel lets it continue.
    fn shutdown_requested(rx: &mut mpsc::Receiver<()>) -> bool {
        !matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty))
    }

    /// BRPOP one job. Returns `None` when the wait times out.
    async fn dequeue(redis: ConnectionManager) -> Result<Option<PostJob>, QueueError> {
        let mut conn = redis;
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(JOB_QUEUE_KEY)
            .arg(DEQUEUE_TIMEOUT_SECS)
            .query_async(&mut conn)
            .await?;

        match popped {
            Some((_, payload)) => {
                let job: PostJob = serde_json::from_str(&payload)?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingRunner {
        calls: AtomicUsize,
        result: WorkerResult,
    }

    #[async_trait::async_trait]
    impl JobRunner for RecordingRunner {
        async fn run(&self, _job: &PostJob) -> WorkerResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn job(task_id: &str) -> PostJob {
        PostJob {
            task_id: task_id.to_string(),
            user_id: 1,
            draft: PostDraft {
                image: "aGk=".to_string(),
                description: "hello".to_string(),
                location: None,
                marked_user_ids: None,
            },
        }
    }

    #[tokio::test]
    async fn inline_enqueue_runs_job_and_carries_result() {
        let runner = Arc::new(RecordingRunner {
            calls: AtomicUsize::new(0),
            result: WorkerResult::solved(5),
        });
        let queue = JobQueue::inline(runner.clone());

        let handle = queue.enqueue(job("t1")).await.unwrap();
        assert_eq!(handle.task_id, "t1");
        assert_eq!(handle.inline_result, Some(WorkerResult::solved(5)));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn inline_enqueue_surfaces_fallen_result() {
        let runner = Arc::new(RecordingRunner {
            calls: AtomicUsize::new(0),
            result: WorkerResult::fallen("invalid image"),
        });
        let queue = JobQueue::inline(runner);

        let handle = queue.enqueue(job("t2")).await.unwrap();
        let result = handle.inline_result.unwrap();
        assert_eq!(result.error.as_deref(), Some("invalid image"));
        assert_eq!(result.post_id, None);
    }

    #[tokio::test]
    async fn shutdown_check_fires_only_after_a_signal() {
        let (tx, mut rx) = mpsc::channel::<()>(1);

        assert!(!WorkerLoop::shutdown_requested(&mut rx));

        tx.send(()).await.unwrap();
        assert!(WorkerLoop::shutdown_requested(&mut rx));

        // a closed channel also stops the loop
        drop(tx);
        assert!(WorkerLoop::shutdown_requested(&mut rx));
    }

    #[test]
    fn job_round_trips_through_serde() {
        let original = job("t3");
        let payload = serde_json::to_string(&original).unwrap();
        let parsed: PostJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed, original);
    }
}
