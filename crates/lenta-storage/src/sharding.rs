//! Sharded key allocation.
//!
//! Users are grouped into buckets of `bucket_size` contiguous ids so no single
//! directory accumulates every user: ids `1..=1000` share bucket `"1-1000"`,
//! `1001..=2000` share `"1001-2000"`, and so on.

use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Bucket name covering the fixed-size id range that contains `user_id`.
pub fn bucket_label(user_id: i64, bucket_size: i64) -> StorageResult<String> {
    if user_id <= 0 {
        return Err(StorageError::InvalidUserId);
    }
    let start = (user_id - 1) / bucket_size * bucket_size;
    Ok(format!("{}-{}", start + 1, start + bucket_size))
}

/// Allocate a fresh storage key: `{bucket}/{user_id}/{uuid}.{ext}`.
///
/// The uuid-v4 component is collision resistant; many posts accumulate under
/// one user directory over time.
pub fn allocate_key(user_id: i64, bucket_size: i64, extension: &str) -> StorageResult<String> {
    let bucket = bucket_label(user_id, bucket_size)?;
    Ok(format!(
        "{}/{}/{}.{}",
        bucket,
        user_id,
        Uuid::new_v4(),
        extension.to_ascii_lowercase()
    ))
}
