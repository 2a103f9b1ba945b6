use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{CredentialsError, ResolvedCredentials, RoleAssumer};

/// A recorded call to [`MockRoleAssumer::assume_role`].
#[derive(Debug, Clone)]
pub struct AssumeRoleCall {
    pub role_arn: String,
    pub session_name: String,
}

/// Mock role assumer for testing.
///
/// Hands out fixed temporary credentials, or fails every call when built
/// with [`MockRoleAssumer::with_failure`].
#[derive(Clone, Default)]
pub struct MockRoleAssumer {
    error_message: Option<String>,
    calls: Arc<Mutex<Vec<AssumeRoleCall>>>,
}

impl MockRoleAssumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(error_msg: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_msg.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<AssumeRoleCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RoleAssumer for MockRoleAssumer {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> Result<ResolvedCredentials, CredentialsError> {
        self.calls.lock().unwrap().push(AssumeRoleCall {
            role_arn: role_arn.to_string(),
            session_name: session_name.to_string(),
        });

        if let Some(message) = &self.error_message {
            return Err(CredentialsError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: message.clone(),
            });
        }

        Ok(ResolvedCredentials {
            access_key_id: "temporary-key".to_string(),
            secret_access_key: "temporary-secret".to_string(),
            session_token: Some("temporary-token".to_string()),
        })
    }
}
