//! Storage module for task attachment bytes
//!
//! [`ObjectStorage`] is the seam services depend on; [`MinIOClient`] is the
//! S3-compatible implementation used in production.

mod minio_client;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Prefix prepended to every object key
    fn key_prefix(&self) -> &str;

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Time-limited download URL for a private object
    async fn presigned_url(&self, key: &str) -> Result<String, AppError>;
}

/// Build the object key for a new attachment on `task_id`.
///
/// The extension comes from the original filename; files without one are
/// stored as `.bin`.
pub fn attachment_key(prefix: &str, task_id: Uuid, original_filename: &str) -> String {
    let extension = original_filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    format!("{}/tasks/{}/{}.{}", prefix, task_id, Uuid::new_v4(), extension)
}
