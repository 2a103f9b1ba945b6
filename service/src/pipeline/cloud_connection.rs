use std::sync::Arc;

use core_types::DeployConfig;
use credentials::RoleAssumer;

use crate::{
    pipeline::{PipelineStep, StepAction},
    session::DeploySession,
};

/// A trait for contexts that need cloud clients.
///
/// Implemented by every pipeline context that talks to S3 or CloudFront.
/// The session is created on first use and kept in the context.
pub trait CloudConnectionContext {
    fn config(&self) -> &DeployConfig;

    fn session(&self) -> Option<&DeploySession>;

    fn session_mut(&mut self) -> &mut Option<DeploySession>;

    /// Role assumer to resolve credentials with, STS when `None`
    fn role_assumer(&self) -> Option<&Arc<dyn RoleAssumer>>;

    /// Check if the connection still has to be established
    fn should_connect(&self) -> bool {
        self.session().is_none()
    }
}

/// Resolves credentials and creates the cloud clients.
///
/// Runs only while the context has no session, so a session handed in by the
/// caller is reused as is. A credential failure aborts the pipeline.
pub struct ConnectToCloudStep<T: CloudConnectionContext> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T: CloudConnectionContext> ConnectToCloudStep<T> {
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: CloudConnectionContext> Default for ConnectToCloudStep<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T: CloudConnectionContext + Send + Sync> PipelineStep<T> for ConnectToCloudStep<T> {
    fn name(&self) -> &'static str {
        "connect_to_cloud"
    }

    fn should_execute(&self, context: &T) -> bool {
        context.should_connect()
    }

    async fn execute(&self, context: &mut T) -> StepAction {
        let connected = match context.role_assumer() {
            Some(assumer) => DeploySession::connect_with(context.config(), assumer.as_ref()).await,
            None => DeploySession::connect(context.config()).await,
        };

        match connected {
            Ok(session) => {
                *context.session_mut() = Some(session);
                StepAction::Continue
            }
            Err(e) => {
                tracing::error!("Error connecting to cloud: {}", e);
                StepAction::Abort(e)
            }
        }
    }
}
