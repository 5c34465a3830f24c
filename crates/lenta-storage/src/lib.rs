//! Image-blob storage for the post pipeline.
//!
//! A stored image is addressed by a sharded key
//! `{bucket}/{user_id}/{random}.{ext}`, where a bucket covers a fixed-size
//! contiguous range of user ids. Two backends implement the same trait: a
//! local filesystem tree and the external blob service reached over HTTP.

pub mod factory;
pub mod http;
pub mod local;
pub mod sharding;
pub mod traits;

pub use factory::create_storage;
pub use http::HttpStorage;
pub use local::LocalStorage;
pub use sharding::{allocate_key, bucket_label};
pub use traits::{Storage, StorageError, StorageResult};
