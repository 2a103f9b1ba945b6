use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{CloudStorageError, ops::CloudStorageOps};

/// An object held by the mock bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
}

/// Internal state for MockCloudStorage.
///
/// Groups all mutable state into a single struct for simplified locking.
#[derive(Default)]
struct MockState {
    /// Objects in the bucket (cloud_key -> object)
    objects: HashMap<String, StoredObject>,
    /// Tracks which keys were deleted
    deleted_files: HashSet<String>,
    /// Keys of every upload attempt, in order, including failed ones
    upload_attempts: Vec<String>,
    /// Keys named by each bulk delete request
    delete_requests: Vec<Vec<String>>,
    /// Keys that should fail on upload
    fail_upload_keys: HashSet<String>,
    fail_list: bool,
    fail_delete: bool,
}

/// Mock implementation of CloudStorageOps for testing
///
/// This mock allows you to:
/// - Seed a bucket with existing objects
/// - Simulate listing, bulk deletion and uploads
/// - Test failure scenarios
/// - Verify what operations were performed and in which order
#[derive(Clone, Default)]
pub struct MockCloudStorage {
    state: Arc<Mutex<MockState>>,
}

impl MockCloudStorage {
    /// Create a new, empty mock bucket
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object that already exists in the bucket (for testing)
    pub fn add_file(&self, cloud_key: impl Into<String>, content: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            cloud_key.into(),
            StoredObject {
                content,
                content_type: None,
            },
        );
    }

    /// Add an object with dummy content
    pub fn add_file_dummy(&self, cloud_key: impl Into<String>) {
        let key = cloud_key.into();
        let content = format!("mock-content-for-{}", key).into_bytes();
        self.add_file(key, content);
    }

    /// Make upload fail for a specific key
    pub fn fail_upload_for(&self, cloud_key: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.fail_upload_keys.insert(cloud_key.into());
    }

    /// Make every listing call fail
    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    /// Make every bulk delete call fail
    pub fn fail_deletion(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    /// Check if an object is currently stored under the key
    pub fn was_uploaded(&self, cloud_key: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.objects.contains_key(cloud_key)
    }

    /// Check if a key was deleted
    pub fn was_deleted(&self, cloud_key: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.deleted_files.contains(cloud_key)
    }

    /// Get the content of a stored object
    pub fn get_uploaded_content(&self, cloud_key: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.objects.get(cloud_key).map(|o| o.content.clone())
    }

    /// Get the content type a stored object was uploaded with
    pub fn get_content_type(&self, cloud_key: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(cloud_key)
            .and_then(|o| o.content_type.clone())
    }

    /// Keys of all stored objects, sorted
    pub fn get_keys(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut keys: Vec<String> = state.objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys of every upload attempt in call order
    pub fn upload_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().upload_attempts.clone()
    }

    /// Keys named by each bulk delete request in call order
    pub fn delete_requests(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().delete_requests.clone()
    }

    /// Get the number of stored objects
    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    /// Clear all state (useful between tests)
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        *state = MockState::default();
    }
}

#[async_trait]
impl CloudStorageOps for MockCloudStorage {
    async fn list_keys(&self) -> Result<Vec<String>, CloudStorageError> {
        if self.state.lock().unwrap().fail_list {
            return Err(CloudStorageError::S3("Mock listing failure".to_string()));
        }
        Ok(self.get_keys())
    }

    async fn delete_keys(&self, cloud_keys: &[String]) -> Result<usize, CloudStorageError> {
        let mut state = self.state.lock().unwrap();
        state.delete_requests.push(cloud_keys.to_vec());

        if state.fail_delete {
            return Err(CloudStorageError::S3("Mock deletion failure".to_string()));
        }

        for key in cloud_keys {
            state.objects.remove(key);
            state.deleted_files.insert(key.clone());
        }

        Ok(cloud_keys.len())
    }

    async fn upload_file(
        &self,
        file_path: &Path,
        cloud_key: &str,
        content_type: Option<&str>,
    ) -> Result<(), CloudStorageError> {
        let should_fail = {
            let mut state = self.state.lock().unwrap();
            state.upload_attempts.push(cloud_key.to_string());
            state.fail_upload_keys.contains(cloud_key)
        };

        if should_fail {
            return Err(CloudStorageError::Other(format!(
                "Mock upload failure for key: {}",
                cloud_key
            )));
        }

        // Read the actual file content (or use dummy data if file doesn't exist)
        // This allows testing without creating actual files
        let content = tokio::fs::read(file_path)
            .await
            .unwrap_or_else(|_| format!("mock-content-for-{}", file_path.display()).into_bytes());

        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            cloud_key.to_string(),
            StoredObject {
                content,
                content_type: content_type.map(str::to_string),
            },
        );

        Ok(())
    }
}
