use std::{path::PathBuf, sync::Arc};

use core_types::{DeployConfig, DeployEvent};
use credentials::RoleAssumer;
use executable_runner::ops::ExecutableRunnerOps;
use flume::Sender;

use crate::{
    deploy::report::DeployReport, pipeline::CloudConnectionContext, session::DeploySession,
};

pub struct DeployContext {
    pub config: Arc<DeployConfig>,
    pub executable_runner: Arc<dyn ExecutableRunnerOps>,
    pub progress_tx: Option<Sender<DeployEvent>>,
    pub skip_build: bool,

    // Filled by ConnectToCloudStep unless handed in by the service
    pub session: Option<DeploySession>,
    pub role_assumer: Option<Arc<dyn RoleAssumer>>,

    // Local files to upload, in enumeration order
    pub manifest: Vec<PathBuf>,

    pub report: DeployReport,
}

impl DeployContext {
    pub fn new(
        config: Arc<DeployConfig>,
        executable_runner: Arc<dyn ExecutableRunnerOps>,
        progress_tx: Option<Sender<DeployEvent>>,
    ) -> Self {
        Self {
            config,
            executable_runner,
            progress_tx,
            skip_build: false,
            session: None,
            role_assumer: None,
            manifest: Vec::new(),
            report: DeployReport::default(),
        }
    }

    pub fn with_session(mut self, session: Option<DeploySession>) -> Self {
        self.session = session;
        self
    }

    pub fn with_role_assumer(mut self, role_assumer: Option<Arc<dyn RoleAssumer>>) -> Self {
        self.role_assumer = role_assumer;
        self
    }

    pub fn with_skip_build(mut self, skip_build: bool) -> Self {
        self.skip_build = skip_build;
        self
    }

    /// Send a progress event. A closed or missing channel is ignored.
    pub async fn send(&self, event: DeployEvent) {
        if let Some(tx) = &self.progress_tx {
            tx.send_async(event).await.ok();
        }
    }
}

impl CloudConnectionContext for DeployContext {
    fn config(&self) -> &DeployConfig {
        &self.config
    }

    fn session(&self) -> Option<&DeploySession> {
        self.session.as_ref()
    }

    fn session_mut(&mut self) -> &mut Option<DeploySession> {
        &mut self.session
    }

    fn role_assumer(&self) -> Option<&Arc<dyn RoleAssumer>> {
        self.role_assumer.as_ref()
    }
}
