//! Post repository: the worker's commit surface plus read-back for the API.

use chrono::{DateTime, Utc};
use lenta_core::models::Post;
use lenta_core::AppError;
use sqlx::{PgPool, Postgres};

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post row and return its id.
    ///
    /// `created_at` is captured once by the caller and reused for every write
    /// in the same unit of work.
    #[tracing::instrument(skip(self, description, location), fields(db.table = "posts"))]
    pub async fn create(
        &self,
        user_id: i64,
        image_path: &str,
        description: &str,
        location: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let post_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (user_id, image_path, description, location, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(image_path)
        .bind(description)
        .bind(location)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(post_id)
    }

    /// Link one marked user to a post.
    #[tracing::instrument(skip(self), fields(db.table = "post_marked_users"))]
    pub async fn add_marked_user(&self, post_id: i64, user_id: i64) -> Result<(), AppError> {
        sqlx::query("INSERT INTO post_marked_users (post_id, user_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetch a post by id.
    #[tracing::instrument(skip(self), fields(db.table = "posts"))]
    pub async fn get(&self, post_id: i64) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<Postgres, Post>(
            "SELECT id, user_id, image_path, description, location, created_at \
             FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    /// Ids of users marked on a post, in ascending id order.
    #[tracing::instrument(skip(self), fields(db.table = "post_marked_users"))]
    pub async fn marked_user_ids(&self, post_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT user_id FROM post_marked_users WHERE post_id = $1 ORDER BY user_id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
