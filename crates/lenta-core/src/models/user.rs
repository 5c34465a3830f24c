use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row. Registration and the subscription graph are owned by other parts
/// of the system; this pipeline only checks existence.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
}

impl User {
    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
        }
    }
}
