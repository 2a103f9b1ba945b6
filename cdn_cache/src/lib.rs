use async_trait::async_trait;
use aws_sdk_cloudfront::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::{DisplayErrorContext, SdkError},
    types::{Invalidation, InvalidationBatch, Paths},
};
use core_types::CacheConfig;
use credentials::{PROVIDER_NAME, ResolvedCredentials};

pub mod mock;
pub mod ops;

pub use ops::CdnCacheOps;

/// Status CloudFront reports once an invalidation has finished.
pub const STATUS_COMPLETED: &str = "Completed";

#[derive(Debug, thiserror::Error)]
pub enum CdnCacheError {
    #[error("CloudFront error: {0}")]
    CloudFront(String),

    #[error("Invalid invalidation request: {0}")]
    InvalidRequest(String),

    #[error("No invalidation returned for distribution {0}")]
    MissingInvalidation(String),
}

fn sdk_error<E, R>(error: SdkError<E, R>) -> CdnCacheError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    CdnCacheError::CloudFront(DisplayErrorContext(error).to_string())
}

/// Identifier and status of an invalidation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationInfo {
    pub id: String,
    pub status: String,
}

impl InvalidationInfo {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

impl From<&Invalidation> for InvalidationInfo {
    fn from(invalidation: &Invalidation) -> Self {
        Self {
            id: invalidation.id().to_string(),
            status: invalidation.status().to_string(),
        }
    }
}

/// Issue an invalidation for the configured distribution and paths.
///
/// The caller reference is the current time in milliseconds. Returns as soon
/// as the request is accepted, the invalidation is usually still in progress.
pub async fn invalidate_cache<C>(
    cdn_ops: &C,
    cache: &CacheConfig,
) -> Result<InvalidationInfo, CdnCacheError>
where
    C: CdnCacheOps + ?Sized,
{
    tracing::info!(
        distribution_id = %cache.distribution_id,
        "Creating CloudFront invalidation"
    );

    let caller_reference = core_types::unix_millis().to_string();
    let invalidation = cdn_ops
        .create_invalidation(
            &cache.distribution_id,
            &cache.paths,
            cache.quantity,
            &caller_reference,
        )
        .await?;

    tracing::info!(
        invalidation_id = %invalidation.id,
        status = %invalidation.status,
        "CloudFront created invalidation"
    );

    Ok(invalidation)
}

/// Report the current status of an invalidation. Makes a single lookup.
pub async fn invalidation_status<C>(
    cdn_ops: &C,
    distribution_id: &str,
    invalidation_id: &str,
) -> Result<InvalidationInfo, CdnCacheError>
where
    C: CdnCacheOps + ?Sized,
{
    match cdn_ops
        .get_invalidation(distribution_id, invalidation_id)
        .await
    {
        Ok(invalidation) => {
            tracing::info!(
                "Distribution : {} > Invalidation : {} - {}",
                distribution_id,
                invalidation_id,
                invalidation.status
            );
            Ok(invalidation)
        }
        Err(e) => {
            tracing::error!(
                "Distribution : {} > Invalidation : {}. Error while getting status: {}",
                distribution_id,
                invalidation_id,
                e
            );
            Err(e)
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudFrontCache {
    client: Client,
}

impl CloudFrontCache {
    pub fn connect(region: &str, credentials: &ResolvedCredentials) -> Self {
        let credentials = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            credentials.session_token.clone(),
            None,
            PROVIDER_NAME,
        );

        let config = aws_sdk_cloudfront::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }
}

#[async_trait]
impl CdnCacheOps for CloudFrontCache {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
        quantity: i32,
        caller_reference: &str,
    ) -> Result<InvalidationInfo, CdnCacheError> {
        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths.to_vec()))
            .build()
            .map_err(|e| CdnCacheError::InvalidRequest(e.to_string()))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference)
            .build()
            .map_err(|e| CdnCacheError::InvalidRequest(e.to_string()))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(sdk_error)?;

        output
            .invalidation()
            .map(InvalidationInfo::from)
            .ok_or_else(|| CdnCacheError::MissingInvalidation(distribution_id.to_string()))
    }

    async fn get_invalidation(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<InvalidationInfo, CdnCacheError> {
        let output = self
            .client
            .get_invalidation()
            .distribution_id(distribution_id)
            .id(invalidation_id)
            .send()
            .await
            .map_err(sdk_error)?;

        output
            .invalidation()
            .map(InvalidationInfo::from)
            .ok_or_else(|| CdnCacheError::MissingInvalidation(distribution_id.to_string()))
    }
}
