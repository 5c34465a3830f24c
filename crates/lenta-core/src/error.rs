//! Error types module
//!
//! All errors are unified under the `AppError` enum, which can represent
//! database, storage, queue, validation, and image-processing failures.
//! Request-rejection errors (`NotFound`, `InvalidInput`) abort a submission
//! before any task state is created; everything else surfaces either through
//! the HTTP layer or as a terminal `fallen` task record.

use sqlx::Error as SqlxError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Human-readable message safe to hand to a status consumer.
    /// Never exposes internal stack state.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "database error".to_string(),
            AppError::Internal(_) => "internal error".to_string(),
            AppError::Storage(msg)
            | AppError::Queue(msg)
            | AppError::ImageProcessing(msg)
            | AppError::InvalidInput(msg)
            | AppError::NotFound(msg) => msg.clone(),
        }
    }
}
