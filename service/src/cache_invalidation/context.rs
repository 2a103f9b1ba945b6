use std::sync::Arc;

use cdn_cache::InvalidationInfo;
use core_types::DeployConfig;
use credentials::RoleAssumer;

use crate::{pipeline::CloudConnectionContext, session::DeploySession};

pub struct CacheContext {
    pub config: Arc<DeployConfig>,
    pub session: Option<DeploySession>,
    pub role_assumer: Option<Arc<dyn RoleAssumer>>,
    pub invalidation: Option<InvalidationInfo>,
}

impl CacheContext {
    pub fn new(config: Arc<DeployConfig>) -> Self {
        Self {
            config,
            session: None,
            role_assumer: None,
            invalidation: None,
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
}

impl CloudConnectionContext for CacheContext {
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

    fn should_connect(&self) -> bool {
        self.session.is_none() && self.config.cache.is_some()
    }
}
