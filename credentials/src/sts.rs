use async_trait::async_trait;
use aws_sdk_sts::{
    Client,
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
};

use crate::{
    CredentialsError, PROVIDER_NAME, ResolvedCredentials, RoleAssumer, StaticCredentials,
};

/// Role assumption through AWS STS, signed with the static credentials.
#[derive(Debug, Clone)]
pub struct StsRoleAssumer {
    client: Client,
}

impl StsRoleAssumer {
    pub fn new(credentials: &StaticCredentials, region: &str) -> Self {
        let credentials = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            None,
            None,
            PROVIDER_NAME,
        );

        let config = aws_sdk_sts::config::Builder::new()
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
impl RoleAssumer for StsRoleAssumer {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<ResolvedCredentials, CredentialsError> {
        let output = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|e| CredentialsError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: DisplayErrorContext(e).to_string(),
            })?;

        let credentials = output
            .credentials()
            .ok_or_else(|| CredentialsError::NoCredentials(role_arn.to_string()))?;

        tracing::info!(role_arn, "Received temporary credentials");

        Ok(ResolvedCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: Some(credentials.session_token().to_string()),
        })
    }
}
