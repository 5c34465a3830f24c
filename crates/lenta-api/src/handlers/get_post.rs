use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use lenta_core::models::PostView;
use lenta_core::{messages, AppError};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Fetch a post created by the pipeline.
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostView>, HttpAppError> {
    let post = state
        .posts
        .get(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::POST_DOES_NOT_EXIST.to_string()))?;
    let marked = state.posts.marked_user_ids(post_id).await?;
    Ok(Json(post.to_view(marked)))
}
