use async_trait::async_trait;

use crate::{CdnCacheError, InvalidationInfo};

/// Trait for CDN cache operations to enable testing
#[async_trait]
pub trait CdnCacheOps: Send + Sync {
    /// Request invalidation of `paths` on a distribution
    ///
    /// `caller_reference` is passed to the provider as an idempotency hint.
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
        quantity: i32,
        caller_reference: &str,
    ) -> Result<InvalidationInfo, CdnCacheError>;

    /// Look up the current state of an earlier invalidation
    async fn get_invalidation(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<InvalidationInfo, CdnCacheError>;
}
