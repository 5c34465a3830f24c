//! User repository: existence checks for submission validation.

use lenta_core::models::User;
use lenta_core::AppError;
use sqlx::{PgPool, Postgres};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user by id.
    #[tracing::instrument(skip(self), fields(db.table = "users"))]
    pub async fn get(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, username, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check whether a user id resolves to an existing row.
    #[tracing::instrument(skip(self), fields(db.table = "users"))]
    pub async fn exists(&self, user_id: i64) -> Result<bool, AppError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}
