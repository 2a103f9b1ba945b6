use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{CdnCacheError, InvalidationInfo, STATUS_COMPLETED, ops::CdnCacheOps};

/// A recorded invalidation request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidationRequest {
    pub distribution_id: String,
    pub paths: Vec<String>,
    pub quantity: i32,
    pub caller_reference: String,
}

#[derive(Default)]
struct MockState {
    requests: Vec<InvalidationRequest>,
    /// invalidation id -> status
    invalidations: HashMap<String, String>,
    status_lookups: usize,
    error_message: Option<String>,
}

/// Mock implementation of CdnCacheOps for testing
///
/// Records every invalidation request. Created invalidations start as
/// `InProgress` and can be finished with [`MockCdnCache::complete`].
#[derive(Clone, Default)]
pub struct MockCdnCache {
    state: Arc<Mutex<MockState>>,
}

impl MockCdnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose invalidation requests all fail
    pub fn with_failure(error_msg: impl Into<String>) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().error_message = Some(error_msg.into());
        mock
    }

    /// Mark an invalidation as completed
    pub fn complete(&self, invalidation_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(status) = state.invalidations.get_mut(invalidation_id) {
            *status = STATUS_COMPLETED.to_string();
        }
    }

    pub fn invalidation_requests(&self) -> Vec<InvalidationRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of calls made to the CDN, of either kind
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.requests.len() + state.status_lookups
    }
}

#[async_trait]
impl CdnCacheOps for MockCdnCache {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[String],
        quantity: i32,
        caller_reference: &str,
    ) -> Result<InvalidationInfo, CdnCacheError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(InvalidationRequest {
            distribution_id: distribution_id.to_string(),
            paths: paths.to_vec(),
            quantity,
            caller_reference: caller_reference.to_string(),
        });

        if let Some(message) = &state.error_message {
            return Err(CdnCacheError::CloudFront(message.clone()));
        }

        let id = format!("MOCKINVALIDATION{}", state.requests.len());
        state.invalidations.insert(id.clone(), "InProgress".to_string());

        Ok(InvalidationInfo {
            id,
            status: "InProgress".to_string(),
        })
    }

    async fn get_invalidation(
        &self,
        distribution_id: &str,
        invalidation_id: &str,
    ) -> Result<InvalidationInfo, CdnCacheError> {
        let mut state = self.state.lock().unwrap();
        state.status_lookups += 1;

        state
            .invalidations
            .get(invalidation_id)
            .map(|status| InvalidationInfo {
                id: invalidation_id.to_string(),
                status: status.clone(),
            })
            .ok_or_else(|| CdnCacheError::MissingInvalidation(distribution_id.to_string()))
    }
}
