use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use lenta_core::models::TaskResponse;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Poll one task's status. Unknown ids are a 404.
pub async fn get_task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, HttpAppError> {
    let response = state.submission.get_status(&task_id).await?;
    Ok(Json(response))
}
