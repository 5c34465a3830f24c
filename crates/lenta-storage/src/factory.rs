use std::sync::Arc;

use lenta_core::{Config, StorageBackend};

use crate::{HttpStorage, LocalStorage, Storage, StorageResult};

/// Create a storage backend based on configuration.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        StorageBackend::Local => {
            let storage =
                LocalStorage::new(&config.local_storage_path, config.items_in_one_folder).await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::Http => Ok(Arc::new(HttpStorage::new(&config.image_storage_url()))),
    }
}
