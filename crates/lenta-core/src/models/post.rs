//! Post entities: the inbound draft, the persisted row, and its view.
//!
//! Entity-to-view mapping is explicit per kind (`Post::to_view`) instead of
//! any runtime-type dispatch on the row object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inbound "create post" payload, passed from submission to worker.
///
/// `marked_user_ids` must be distinct existing users and must not include the
/// owner; drafts violating that are rejected before a task id is issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    /// Base64-encoded image payload.
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub marked_user_ids: Option<Vec<i64>>,
}

/// Persisted post row. Created exactly once, by the ingest worker.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub description: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub user_id: i64,
    pub image_path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub marked_user_ids: Vec<i64>,
}

impl Post {
    pub fn to_view(&self, marked_user_ids: Vec<i64>) -> PostView {
        PostView {
            id: self.id,
            user_id: self.user_id,
            image_path: self.image_path.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            created_at: self.created_at,
            marked_user_ids,
        }
    }
}
