use std::path::Path;

use async_trait::async_trait;

use crate::CloudStorageError;

/// Trait for cloud storage operations to enable testing
#[async_trait]
pub trait CloudStorageOps: Send + Sync {
    /// List the keys of every object currently in the bucket
    async fn list_keys(&self) -> Result<Vec<String>, CloudStorageError>;

    /// Delete the given keys using bulk delete requests
    ///
    /// Returns the number of keys deleted.
    async fn delete_keys(&self, cloud_keys: &[String]) -> Result<usize, CloudStorageError>;

    /// Upload a file as a publicly readable object, replacing any object
    /// already stored under the same key
    ///
    /// When `content_type` is `None` the provider's default is used.
    async fn upload_file(
        &self,
        file_path: &Path,
        cloud_key: &str,
        content_type: Option<&str>,
    ) -> Result<(), CloudStorageError>;
}
