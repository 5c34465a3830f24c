//! The asynchronous half of the post-creation pipeline: the Redis-backed
//! task-status store and job queue, the ingest worker that consumes jobs,
//! and the submission service that produces them.

pub mod ingest;
pub mod queue;
pub mod status;
pub mod submit;

pub use ingest::PostIngestWorker;
pub use queue::{JobHandle, JobQueue, JobRunner, PostJob, WorkerLoop};
pub use status::{StatusStore, TaskStatusStore};
pub use submit::{PostSubmissionService, UserLookup};

/// Errors from the Redis queue/status layer.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("redis connection failed: {0}")]
    ConnectionFailed(String),

    #[error("redis operation failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("job serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
