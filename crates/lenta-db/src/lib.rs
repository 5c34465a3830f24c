//! Database repositories for the post pipeline.
//!
//! Repositories are plain structs holding a `PgPool`, constructed at startup
//! and handed to the components that need them. Relations are always queried
//! by foreign key; there are no in-memory back-references between entities.

pub mod posts;
pub mod users;

pub use posts::PostRepository;
pub use users::UserRepository;

/// Embedded migrations for the pipeline's tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
