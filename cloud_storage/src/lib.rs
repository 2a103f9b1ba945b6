// S3 access for the deploy. The bucket, region and optional endpoint come from
// the deploy configuration, credentials from the credentials crate:
// - static access key id / secret access key, or
// - temporary keys and session token from an assumed role
//

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
    types::{Delete, ObjectCannedAcl, ObjectIdentifier},
};
use credentials::{PROVIDER_NAME, ResolvedCredentials};

pub mod mock;
pub mod ops;

pub use ops::CloudStorageOps;

/// Largest number of keys a single DeleteObjects request accepts.
pub const MAX_DELETE_BATCH: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum CloudStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Failed to delete {failed} objects, first failure {key}: {message}")]
    PartialDelete {
        failed: usize,
        key: String,
        message: String,
    },

    #[error("Other error: {0}")]
    Other(String),
}

fn sdk_error<E, R>(error: SdkError<E, R>) -> CloudStorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    CloudStorageError::S3(DisplayErrorContext(error).to_string())
}

/// Content type for a file based on its extension, `None` when the
/// extension is not recognized.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

#[derive(Debug, Clone)]
pub struct S3CloudStorage {
    client: Client,
    bucket: String,
}

impl S3CloudStorage {
    /// Build a client for `bucket`. No request is made until the first operation.
    ///
    /// With `endpoint_url` set, requests go to that endpoint using path style
    /// addressing, for S3 compatible stores.
    pub fn connect(
        bucket: &str,
        region: &str,
        endpoint_url: Option<&str>,
        credentials: &ResolvedCredentials,
    ) -> Self {
        let credentials = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            credentials.session_token.clone(),
            None,
            PROVIDER_NAME,
        );

        let mut config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint_url) = endpoint_url {
            config = config.endpoint_url(endpoint_url).force_path_style(true);
        }

        Self {
            client: Client::from_conf(config.build()),
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl CloudStorageOps for S3CloudStorage {
    async fn list_keys(&self) -> Result<Vec<String>, CloudStorageError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(sdk_error)?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_string),
            );

            continuation_token = output.next_continuation_token().map(str::to_string);
            if output.is_truncated() != Some(true) || continuation_token.is_none() {
                break;
            }
            tracing::debug!(listed = keys.len(), "Listing next page of objects");
        }

        Ok(keys)
    }

    async fn delete_keys(&self, cloud_keys: &[String]) -> Result<usize, CloudStorageError> {
        let mut deleted = 0;

        for batch in cloud_keys.chunks(MAX_DELETE_BATCH) {
            let objects = batch
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| CloudStorageError::Other(e.to_string()))?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| CloudStorageError::Other(e.to_string()))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(sdk_error)?;

            if let Some(first) = output.errors().first() {
                return Err(CloudStorageError::PartialDelete {
                    failed: output.errors().len(),
                    key: first.key().unwrap_or_default().to_string(),
                    message: first.message().unwrap_or_default().to_string(),
                });
            }

            deleted += batch.len();
            tracing::debug!(deleted, "Deleted batch of objects");
        }

        Ok(deleted)
    }

    async fn upload_file(
        &self,
        file_path: &Path,
        cloud_key: &str,
        content_type: Option<&str>,
    ) -> Result<(), CloudStorageError> {
        let content = tokio::fs::read(file_path).await?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(cloud_key)
            .body(ByteStream::from(content))
            .set_content_type(content_type.map(str::to_string))
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(())
    }
}
