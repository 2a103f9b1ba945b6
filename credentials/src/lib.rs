use std::fmt;

use async_trait::async_trait;

pub mod mock;
pub mod sts;

pub use sts::StsRoleAssumer;

/// Provider name attached to credentials handed to the AWS clients.
pub const PROVIDER_NAME: &str = "s3deploy";

/// Long-lived access key pair taken from the deploy configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Credentials the storage and CDN clients are built with.
///
/// Either a copy of the static keys, or temporary keys plus a session token
/// obtained by assuming a cross-account role.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl From<StaticCredentials> for ResolvedCredentials {
    fn from(credentials: StaticCredentials) -> Self {
        Self {
            access_key_id: credentials.access_key_id,
            secret_access_key: credentials.secret_access_key,
            session_token: None,
        }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("temporary", &self.session_token.is_some())
            .finish_non_exhaustive()
    }
}

/// Errors that can occur while resolving credentials
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("Failed to assume role {role_arn}: {message}")]
    AssumeRole { role_arn: String, message: String },

    #[error("Role assumption for {0} returned no credentials")]
    NoCredentials(String),
}

/// Exchanges long-lived credentials for temporary ones.
#[async_trait]
pub trait RoleAssumer: Send + Sync {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<ResolvedCredentials, CredentialsError>;
}

/// Session name for a role assumption, `deploy-session-<unix millis>`.
///
/// Two invocations in the same millisecond get the same name.
pub fn session_name() -> String {
    format!("deploy-session-{}", core_types::unix_millis())
}

/// Resolve the credentials the deploy clients should use.
///
/// Without a role ARN the static keys are returned unchanged and `assumer`
/// is never called. With one, the temporary credentials from the role
/// assumption are returned; a failed assumption is returned as an error.
pub async fn resolve_credentials<A>(
    static_credentials: StaticCredentials,
    role_arn: Option<&str>,
    assumer: &A,
) -> Result<ResolvedCredentials, CredentialsError>
where
    A: RoleAssumer + ?Sized,
{
    let Some(role_arn) = role_arn else {
        tracing::debug!("No cross account role, using static credentials");
        return Ok(static_credentials.into());
    };

    let session_name = session_name();
    tracing::info!(role_arn, session_name = %session_name, "Assuming cross account role");
    assumer.assume_role(role_arn, &session_name).await
}
