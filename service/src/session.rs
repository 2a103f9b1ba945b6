use std::sync::Arc;

use cdn_cache::{CdnCacheOps, CloudFrontCache};
use cloud_storage::{CloudStorageOps, S3CloudStorage};
use core_types::DeployConfig;
use credentials::{RoleAssumer, StaticCredentials, StsRoleAssumer, resolve_credentials};

use crate::error::Error;

/// Client handles for one deploy configuration.
///
/// Trait objects so that tests can swap in the mock implementations.
#[derive(Clone)]
pub struct DeploySession {
    pub cloud_ops: Arc<dyn CloudStorageOps>,
    pub cdn_ops: Arc<dyn CdnCacheOps>,
}

impl DeploySession {
    pub fn new(cloud_ops: Arc<dyn CloudStorageOps>, cdn_ops: Arc<dyn CdnCacheOps>) -> Self {
        Self { cloud_ops, cdn_ops }
    }

    /// Resolve credentials for `config` and build the S3 and CloudFront clients.
    ///
    /// Assumes `CROSS_ACCOUNT_ROLE` through STS when one is configured.
    pub async fn connect(config: &DeployConfig) -> Result<Self, Error> {
        let assumer = StsRoleAssumer::new(&static_credentials(config), &config.region);
        Self::connect_with(config, &assumer).await
    }

    /// Like [`DeploySession::connect`] with the given role assumer.
    pub async fn connect_with<A>(config: &DeployConfig, assumer: &A) -> Result<Self, Error>
    where
        A: RoleAssumer + ?Sized,
    {
        let credentials = resolve_credentials(
            static_credentials(config),
            config.cross_account_role.as_deref(),
            assumer,
        )
        .await?;

        tracing::debug!(
            bucket = %config.bucket_name,
            region = %config.region,
            temporary_credentials = credentials.session_token.is_some(),
            "Creating cloud clients"
        );

        let cloud_ops = S3CloudStorage::connect(
            &config.bucket_name,
            &config.region,
            config.endpoint_url.as_deref(),
            &credentials,
        );
        let cdn_ops = CloudFrontCache::connect(&config.region, &credentials);

        Ok(Self::new(Arc::new(cloud_ops), Arc::new(cdn_ops)))
    }
}

fn static_credentials(config: &DeployConfig) -> StaticCredentials {
    StaticCredentials {
        access_key_id: config.access_key_id.clone(),
        secret_access_key: config.secret_access_key.clone(),
    }
}
