//! Post submission service: the producer side of the pipeline.
//!
//! Validates request-level invariants synchronously, allocates a task id,
//! enqueues the job, and registers the task as in-progress. Validation
//! failures abort before any task state exists, so a rejected draft never
//! leaves an orphaned task id behind.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use lenta_core::models::{PostDraft, TaskResponse, TaskState, WorkerResult};
use lenta_core::{messages, AppError};
use lenta_db::UserRepository;

use crate::queue::{JobQueue, PostJob};
use crate::status::StatusStore;

/// Existence checks the submission path needs from the relational store.
#[async_trait::async_trait]
pub trait UserLookup: Send + Sync {
    async fn exists(&self, user_id: i64) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl UserLookup for UserRepository {
    async fn exists(&self, user_id: i64) -> Result<bool, AppError> {
        UserRepository::exists(self, user_id).await
    }
}

/// Reject drafts that violate request-level invariants.
///
/// - owner must exist (`user does not exist`);
/// - marked ids must be distinct, must not include the owner, and must all
///   resolve to existing users (`incorrectly marked users`).
pub async fn validate_submission(
    users: &dyn UserLookup,
    user_id: i64,
    draft: &PostDraft,
) -> Result<(), AppError> {
    if !users.exists(user_id).await? {
        return Err(AppError::NotFound(messages::USER_DOES_NOT_EXIST.to_string()));
    }

    if let Some(marked) = &draft.marked_user_ids {
        let distinct: HashSet<i64> = marked.iter().copied().collect();
        if distinct.len() != marked.len() || distinct.contains(&user_id) {
            return Err(AppError::InvalidInput(
                messages::INCORRECTLY_MARKED_USERS.to_string(),
            ));
        }
        for marked_id in marked {
            if !users.exists(*marked_id).await? {
                return Err(AppError::InvalidInput(
                    messages::INCORRECTLY_MARKED_USERS.to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Build the submission response from the queue handle: an inline result (if
/// the queue executed the job before returning) wins over pending.
pub fn build_submission_response(
    task_id: String,
    inline_result: Option<&WorkerResult>,
) -> TaskResponse {
    match inline_result {
        Some(result) => TaskResponse::from_state(task_id, &result.to_state()),
        None => TaskResponse::from_state(task_id, &TaskState::InProgress),
    }
}

pub struct PostSubmissionService {
    users: Arc<dyn UserLookup>,
    queue: JobQueue,
    status: Arc<dyn StatusStore>,
}

impl PostSubmissionService {
    pub fn new(users: Arc<dyn UserLookup>, queue: JobQueue, status: Arc<dyn StatusStore>) -> Self {
        Self {
            users,
            queue,
            status,
        }
    }

    /// Validate, enqueue, and register one post-creation task.
    ///
    /// `mark_in_progress` is unconditional, even when the queue ran the job
    /// inline and already wrote a terminal record. Status lookup checks the
    /// terminal collections first, so the stale in-progress member is benign
    /// and the polling contract stays uniform across execution modes.
    #[tracing::instrument(skip(self, draft))]
    pub async fn submit(&self, user_id: i64, draft: PostDraft) -> Result<TaskResponse, AppError> {
        validate_submission(self.users.as_ref(), user_id, &draft).await?;

        let task_id = Uuid::new_v4().to_string();
        let job = PostJob {
            task_id: task_id.clone(),
            user_id,
            draft,
        };

        let handle = self
            .queue
            .enqueue(job)
            .await
            .map_err(|e| AppError::Queue(e.to_string()))?;
        self.status
            .mark_in_progress(&task_id)
            .await
            .map_err(|e| AppError::Queue(e.to_string()))?;

        tracing::info!(task_id = %task_id, "post submission accepted");
        Ok(build_submission_response(
            task_id,
            handle.inline_result.as_ref(),
        ))
    }

    /// Look up a task's derived state. Side-effect free; poll at will.
    pub async fn get_status(&self, task_id: &str) -> Result<TaskResponse, AppError> {
        let state = self
            .status
            .status(task_id)
            .await
            .map_err(|e| AppError::Queue(e.to_string()))?;
        match state {
            Some(state) => Ok(TaskResponse::from_state(task_id, &state)),
            None => Err(AppError::NotFound(messages::TASK_DOES_NOT_EXIST.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::queue::JobRunner;
    use crate::QueueError;

    /// Users 1..=max exist.
    struct UsersUpTo(i64);

    #[async_trait::async_trait]
    impl UserLookup for UsersUpTo {
        async fn exists(&self, user_id: i64) -> Result<bool, AppError> {
            Ok(user_id >= 1 && user_id <= self.0)
        }
    }

    fn draft(marked: Option<Vec<i64>>) -> PostDraft {
        PostDraft {
            image: "aGk=".to_string(),
            description: "caption".to_string(),
            location: None,
            marked_user_ids: marked,
        }
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let err = validate_submission(&UsersUpTo(3), 9, &draft(None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.client_message(), "user does not exist");
    }

    #[tokio::test]
    async fn rejects_duplicate_marked_users() {
        let err = validate_submission(&UsersUpTo(3), 1, &draft(Some(vec![2, 2])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.client_message(), "incorrectly marked users");
    }

    #[tokio::test]
    async fn rejects_self_reference_in_marked_users() {
        let err = validate_submission(&UsersUpTo(3), 1, &draft(Some(vec![1])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_nonexistent_marked_user() {
        let err = validate_submission(&UsersUpTo(3), 1, &draft(Some(vec![99])))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn accepts_distinct_existing_marked_users() {
        validate_submission(&UsersUpTo(3), 1, &draft(Some(vec![2, 3])))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn accepts_empty_marked_list() {
        validate_submission(&UsersUpTo(3), 1, &draft(Some(vec![])))
            .await
            .unwrap();
        validate_submission(&UsersUpTo(3), 1, &draft(None)).await.unwrap();
    }

    /// Same three collections and lookup order as the Redis store.
    #[derive(Default)]
    struct InMemoryStatus {
        in_progress: Mutex<HashSet<String>>,
        solved: Mutex<HashMap<String, i64>>,
        fallen: Mutex<HashMap<String, String>>,
    }

    #[async_trait::async_trait]
    impl StatusStore for InMemoryStatus {
        async fn mark_in_progress(&self, task_id: &str) -> Result<(), QueueError> {
            self.in_progress.lock().unwrap().insert(task_id.to_string());
            Ok(())
        }

        async fn mark_solved(&self, task_id: &str, post_id: i64) -> Result<(), QueueError> {
            self.solved.lock().unwrap().insert(task_id.to_string(), post_id);
            self.in_progress.lock().unwrap().remove(task_id);
            Ok(())
        }

        async fn mark_fallen(&self, task_id: &str, error_text: &str) -> Result<(), QueueError> {
            self.fallen
                .lock()
                .unwrap()
                .insert(task_id.to_string(), error_text.to_string());
            self.in_progress.lock().unwrap().remove(task_id);
            Ok(())
        }

        async fn status(&self, task_id: &str) -> Result<Option<TaskState>, QueueError> {
            if let Some(post_id) = self.solved.lock().unwrap().get(task_id) {
                return Ok(Some(TaskState::Solved { post_id: *post_id }));
            }
            if let Some(error) = self.fallen.lock().unwrap().get(task_id) {
                return Ok(Some(TaskState::Fallen {
                    error: error.clone(),
                }));
            }
            if self.in_progress.lock().unwrap().contains(task_id) {
                return Ok(Some(TaskState::InProgress));
            }
            Ok(None)
        }
    }

    /// Returns a fixed result without touching any status store, so the task
    /// stays wherever the producer left it.
    struct StubRunner(WorkerResult);

    #[async_trait::async_trait]
    impl JobRunner for StubRunner {
        async fn run(&self, _job: &PostJob) -> WorkerResult {
            self.0.clone()
        }
    }

    fn service(runner: Arc<dyn JobRunner>, status: Arc<InMemoryStatus>) -> PostSubmissionService {
        PostSubmissionService::new(Arc::new(UsersUpTo(3)), JobQueue::inline(runner), status)
    }

    #[tokio::test]
    async fn each_submission_gets_a_distinct_task_id() {
        let status = Arc::new(InMemoryStatus::default());
        let service = service(
            Arc::new(StubRunner(WorkerResult::solved(7))),
            status.clone(),
        );

        let first = service.submit(1, draft(None)).await.unwrap();
        let second = service.submit(1, draft(None)).await.unwrap();

        assert_ne!(first.task_id, second.task_id);
        let in_progress = status.in_progress.lock().unwrap();
        assert!(in_progress.contains(&first.task_id));
        assert!(in_progress.contains(&second.task_id));
    }

    #[tokio::test]
    async fn task_moves_from_absent_to_in_progress_to_ready() {
        let status = Arc::new(InMemoryStatus::default());
        let service = service(
            Arc::new(StubRunner(WorkerResult::solved(7))),
            status.clone(),
        );

        let err = service.get_status("no-such-task").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.client_message(), "task does not exist");

        let accepted = service.submit(2, draft(None)).await.unwrap();
        let pending = service.get_status(&accepted.task_id).await.unwrap();
        assert_eq!(pending.status, "accepted for processing");

        status.mark_solved(&accepted.task_id, 42).await.unwrap();
        let ready = service.get_status(&accepted.task_id).await.unwrap();
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.post_id, Some(42));
    }

    #[tokio::test]
    async fn rejected_draft_registers_no_task_state() {
        let status = Arc::new(InMemoryStatus::default());
        let service = service(
            Arc::new(StubRunner(WorkerResult::solved(7))),
            status.clone(),
        );

        service.submit(9, draft(None)).await.unwrap_err();

        assert!(status.in_progress.lock().unwrap().is_empty());
        assert!(status.solved.lock().unwrap().is_empty());
        assert!(status.fallen.lock().unwrap().is_empty());
    }

    /// Worker that records its terminal state, as the real ingest worker does.
    struct CompletingRunner {
        status: Arc<InMemoryStatus>,
    }

    #[async_trait::async_trait]
    impl JobRunner for CompletingRunner {
        async fn run(&self, job: &PostJob) -> WorkerResult {
            self.status.mark_solved(&job.task_id, 11).await.unwrap();
            WorkerResult::solved(11)
        }
    }

    #[tokio::test]
    async fn inline_completion_beats_the_in_progress_marker() {
        let status = Arc::new(InMemoryStatus::default());
        let service = service(
            Arc::new(CompletingRunner {
                status: status.clone(),
            }),
            status.clone(),
        );

        // the job ran before mark_in_progress; the terminal record wins
        let resp = service.submit(1, draft(None)).await.unwrap();
        assert_eq!(resp.status, "ready");
        assert!(status.in_progress.lock().unwrap().contains(&resp.task_id));

        let polled = service.get_status(&resp.task_id).await.unwrap();
        assert_eq!(polled.status, "ready");
        assert_eq!(polled.post_id, Some(11));
    }

    #[test]
    fn pending_response_when_no_inline_result() {
        let resp = build_submission_response("t1".to_string(), None);
        assert_eq!(resp.status, "accepted for processing");
        assert_eq!(resp.post_id, None);
        assert_eq!(resp.error_text, None);
    }

    #[test]
    fn inline_solved_result_wins_over_pending() {
        let result = WorkerResult::solved(11);
        let resp = build_submission_response("t2".to_string(), Some(&result));
        assert_eq!(resp.status, "ready");
        assert_eq!(resp.post_id, Some(11));
    }

    #[test]
    fn inline_fallen_result_carries_error_text() {
        let result = WorkerResult::fallen("invalid base64 padding");
        let resp = build_submission_response("t3".to_string(), Some(&result));
        assert_eq!(resp.status, "fallen");
        assert_eq!(resp.error_text.as_deref(), Some("invalid base64 padding"));
    }
}
