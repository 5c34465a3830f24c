//! HTTP client for the external image-blob service.
//!
//! The service owns path allocation on its side; the wire contract is
//! `POST /images {user_id, image: base64} -> 201 {path}` and
//! `GET /images?image_path=... -> 200 {image: base64}`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lenta_core::StorageBackend;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::traits::{Storage, StorageError, StorageResult};

#[derive(Clone)]
pub struct HttpStorage {
    client: reqwest::Client,
    images_url: String,
}

#[derive(Serialize)]
struct StoreRequest<'a> {
    user_id: i64,
    image: &'a str,
}

#[derive(Deserialize)]
struct StoreResponse {
    path: String,
}

#[derive(Deserialize)]
struct FetchResponse {
    image: String,
}

impl HttpStorage {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            images_url: format!("{}/images", base_url.trim_end_matches('/')),
        }
    }

    async fn error_text(response: reqwest::Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) if !body.is_empty() => format!("{}: {}", status, body),
            _ => status.to_string(),
        }
    }
}

#[async_trait]
impl Storage for HttpStorage {
    async fn store(&self, user_id: i64, data: Vec<u8>, _extension: &str) -> StorageResult<String> {
        let encoded = STANDARD.encode(&data);
        let payload = StoreRequest {
            user_id,
            image: &encoded,
        };
        let response = self
            .client
            .post(&self.images_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        if response.status() != StatusCode::CREATED {
            return Err(StorageError::UploadFailed(
                Self::error_text(response).await,
            ));
        }

        let body: StoreResponse = response
            .json()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        tracing::debug!(user_id, path = %body.path, "stored image via blob service");
        Ok(body.path)
    }

    async fn fetch(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.images_url)
            .query(&[("image_path", storage_key)])
            .send()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body: FetchResponse = response
                    .json()
                    .await
                    .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
                STANDARD
                    .decode(&body.image)
                    .map_err(|e| StorageError::DownloadFailed(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(storage_key.to_string())),
            _ => Err(StorageError::DownloadFailed(
                Self::error_text(response).await,
            )),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_url_normalizes_trailing_slash() {
        let a = HttpStorage::new("http://127.0.0.1:5000");
        let b = HttpStorage::new("http://127.0.0.1:5000/");
        assert_eq!(a.images_url, "http://127.0.0.1:5000/images");
        assert_eq!(b.images_url, a.images_url);
    }
}
