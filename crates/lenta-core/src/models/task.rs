//! Task-status protocol types.
//!
//! A task lives only in the status store: an in-progress set plus two terminal
//! hashes (solved, fallen). `TaskState` is derived by reading those collections
//! in priority order, never stored directly.

use serde::{Deserialize, Serialize};

use crate::messages;

/// Derived state of one post-creation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    /// Registered by the producer, no terminal write yet.
    InProgress,
    /// The worker committed the post.
    Solved { post_id: i64 },
    /// The worker hit a terminal failure.
    Fallen { error: String },
}

impl TaskState {
    pub fn status_label(&self) -> &'static str {
        match self {
            TaskState::InProgress => messages::POST_ACCEPTED_FOR_PROCESSING,
            TaskState::Solved { .. } => messages::POST_READY,
            TaskState::Fallen { .. } => messages::POST_TASK_FALLEN,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::InProgress)
    }
}

/// What the ingest worker hands back for one job: exactly one of `post_id`
/// or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkerResult {
    pub post_id: Option<i64>,
    pub error: Option<String>,
}

impl WorkerResult {
    pub fn solved(post_id: i64) -> Self {
        Self {
            post_id: Some(post_id),
            error: None,
        }
    }

    pub fn fallen(error: impl Into<String>) -> Self {
        Self {
            post_id: None,
            error: Some(error.into()),
        }
    }

    pub fn to_state(&self) -> TaskState {
        match (self.post_id, &self.error) {
            (Some(post_id), _) => TaskState::Solved { post_id },
            (None, Some(error)) => TaskState::Fallen {
                error: error.clone(),
            },
            // A result with neither field is a worker bug; surface it as fallen
            // rather than leaving the task in-progress forever.
            (None, None) => TaskState::Fallen {
                error: "worker returned no result".to_string(),
            },
        }
    }
}

/// Wire shape for submission responses and status polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    pub task_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl TaskResponse {
    pub fn from_state(task_id: impl Into<String>, state: &TaskState) -> Self {
        let (post_id, error_text) = match state {
            TaskState::InProgress => (None, None),
            TaskState::Solved { post_id } => (Some(*post_id), None),
            TaskState::Fallen { error } => (None, Some(error.clone())),
        };
        Self {
            task_id: task_id.into(),
            status: state.status_label().to_string(),
            post_id,
            error_text,
        }
    }
}
