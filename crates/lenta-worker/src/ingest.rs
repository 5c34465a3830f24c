//! Post ingest worker: decode, crop, store, persist, mark.
//!
//! `process` is the catch-all boundary for one job: every failure inside it
//! resolves to a terminal fallen record with a human-readable message, so a
//! task can never stay in-progress because of an unclassified error. There is
//! no caller left to observe a propagated fault once the job is off the
//! request path.

use std::sync::Arc;

use chrono::Utc;

use lenta_core::models::WorkerResult;
use lenta_db::PostRepository;
use lenta_processing::{codec, crop_to_square};
use lenta_storage::Storage;

use crate::queue::{JobRunner, PostJob};
use crate::status::TaskStatusStore;

pub struct PostIngestWorker {
    posts: PostRepository,
    storage: Arc<dyn Storage>,
    status: TaskStatusStore,
    aspect_resolution: u32,
}

impl PostIngestWorker {
    pub fn new(
        posts: PostRepository,
        storage: Arc<dyn Storage>,
        status: TaskStatusStore,
        aspect_resolution: u32,
    ) -> Self {
        Self {
            posts,
            storage,
            status,
            aspect_resolution,
        }
    }

    /// Run one job to a terminal state and record it in the status store.
    #[tracing::instrument(skip(self, job), fields(task_id = %job.task_id, user_id = job.user_id))]
    pub async fn process(&self, job: &PostJob) -> WorkerResult {
        match self.try_process(job).await {
            Ok(post_id) => {
                if let Err(e) = self.status.mark_solved(&job.task_id, post_id).await {
                    tracing::error!(error = %e, post_id, "failed to mark task solved");
                } else {
                    tracing::info!(post_id, "post created");
                }
                WorkerResult::solved(post_id)
            }
            Err(error_text) => {
                if let Err(e) = self.status.mark_fallen(&job.task_id, &error_text).await {
                    tracing::error!(error = %e, "failed to mark task fallen");
                } else {
                    tracing::warn!(error_text = %error_text, "post creation fell");
                }
                WorkerResult::fallen(error_text)
            }
        }
    }

    /// The pipeline proper. Errors are already client-safe message strings.
    async fn try_process(&self, job: &PostJob) -> Result<i64, String> {
        let draft = &job.draft;

        let bytes = codec::decode_base64(&draft.image).map_err(|e| e.to_string())?;
        let decoded = codec::decode_image(&bytes).map_err(|e| e.to_string())?;
        let format = decoded.format;
        let extension = decoded.extension();

        let cropped =
            crop_to_square(decoded.image, self.aspect_resolution).map_err(|e| e.to_string())?;
        let encoded = codec::encode_image(&cropped, format).map_err(|e| e.to_string())?;

        let image_path = self
            .storage
            .store(job.user_id, encoded, extension)
            .await
            .map_err(|e| e.to_string())?;

        // One timestamp for every write in this unit of work.
        let created_at = Utc::now();
        let post_id = self
            .posts
            .create(
                job.user_id,
                &image_path,
                &draft.description,
                draft.location.as_deref(),
                created_at,
            )
            .await
            .map_err(|e| e.client_message())?;

        for marked_id in draft.marked_user_ids.iter().flatten() {
            self.posts
                .add_marked_user(post_id, *marked_id)
                .await
                .map_err(|e| e.client_message())?;
        }

        Ok(post_id)
    }
}

#[async_trait::async_trait]
impl JobRunner for PostIngestWorker {
    async fn run(&self, job: &PostJob) -> WorkerResult {
        self.process(job).await
    }
}
