//! Configuration module
//!
//! Env-driven configuration, read once at startup and passed into components
//! at construction time. No component reaches for the environment (or a
//! global connection handle) after startup.

use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_ASPECT_RESOLUTION: u32 = 640;
const DEFAULT_ITEMS_IN_ONE_FOLDER: i64 = 1000;
const DEFAULT_WORKER_CONCURRENCY: usize = 4;

/// Storage backend for transformed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Sharded directories on the local filesystem.
    Local,
    /// The external image-blob service, reached over HTTP.
    Http,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "http" => Ok(StorageBackend::Http),
            other => Err(anyhow::anyhow!("Invalid storage backend: {}", other)),
        }
    }
}

/// How the job queue executes enqueued work.
///
/// `Deferred` is the production discipline: jobs are pushed to Redis and
/// consumed by the worker loop. `Inline` runs the job inside the enqueue
/// call itself (single-process/test deployments); the submission handle then
/// already carries the worker result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Deferred,
    Inline,
}

impl FromStr for ExecutionMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deferred" => Ok(ExecutionMode::Deferred),
            "inline" => Ok(ExecutionMode::Inline),
            other => Err(anyhow::anyhow!("Invalid execution mode: {}", other)),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Deferred => write!(f, "deferred"),
            ExecutionMode::Inline => write!(f, "inline"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub image_storage_address: String,
    pub image_storage_port: u16,
    /// Target side length for the square crop.
    pub aspect_resolution: u32,
    /// User ids per storage bucket (shard size).
    pub items_in_one_folder: i64,
    pub execution_mode: ExecutionMode,
    /// Max jobs processed concurrently by one worker process.
    pub worker_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let aspect_resolution = env::var("ASPECT_RESOLUTION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_ASPECT_RESOLUTION);
        if aspect_resolution == 0 {
            return Err(anyhow::anyhow!("ASPECT_RESOLUTION must be at least 1"));
        }

        Ok(Config {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            database_url,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            redis_url,
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "local".to_string())
                .parse()?,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "image_storage".to_string()),
            image_storage_address: env::var("IMAGE_STORAGE_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            image_storage_port: env::var("IMAGE_STORAGE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            aspect_resolution,
            items_in_one_folder: env::var("ITEMS_IN_ONE_FOLDER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ITEMS_IN_ONE_FOLDER),
            execution_mode: env::var("WORKER_EXECUTION_MODE")
                .unwrap_or_else(|_| "deferred".to_string())
                .parse()?,
            worker_concurrency: env::var("WORKER_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_WORKER_CONCURRENCY),
        })
    }

    /// Base URL of the external image-blob service.
    pub fn image_storage_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.image_storage_address, self.image_storage_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!(
            "Local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert_eq!(
            "HTTP".parse::<StorageBackend>().unwrap(),
            StorageBackend::Http
        );
        assert!("s3".parse::<StorageBackend>().is_err());
    }

    // single env-touching test; keeps process-global state race-free
    #[test]
    fn zero_aspect_resolution_is_rejected_at_startup() {
        env::set_var("DATABASE_URL", "postgres://localhost/lenta");

        env::set_var("ASPECT_RESOLUTION", "0");
        assert!(Config::from_env().is_err());

        env::set_var("ASPECT_RESOLUTION", "2");
        let config = Config::from_env().unwrap();
        assert_eq!(config.aspect_resolution, 2);

        env::remove_var("ASPECT_RESOLUTION");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn execution_mode_defaults_to_deferred() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Deferred);
        assert_eq!(
            "inline".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Inline
        );
    }
}
