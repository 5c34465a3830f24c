//! Lenta Core Library
//!
//! Shared domain models, error types, configuration, and message constants
//! used by every other lenta crate.

pub mod config;
pub mod error;
pub mod messages;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ExecutionMode, StorageBackend};
pub use error::AppError;
