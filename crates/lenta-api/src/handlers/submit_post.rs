use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use lenta_core::models::{PostDraft, TaskResponse};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Accept a "create post" draft for asynchronous processing.
///
/// Validation failures (unknown owner, bad marked-user list) reject the
/// request synchronously; otherwise the response carries a task id to poll.
/// When the queue ran the job inline the status is already terminal.
#[tracing::instrument(skip(state, draft))]
pub async fn submit_post(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<TaskResponse>), HttpAppError> {
    let response = state.submission.submit(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
