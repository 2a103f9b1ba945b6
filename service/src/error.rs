use std::fmt::{Display, Formatter, Result};

use cdn_cache::CdnCacheError;
use cloud_storage::CloudStorageError;
use credentials::CredentialsError;
use executable_runner::error::ExecutableRunnerError;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    CredentialsError(String),
    BuildError(String),
    IoError(String),
    CloudSyncError(String),
    CacheError(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::CredentialsError(message) => write!(f, "Credentials error: {}", message),
            Error::BuildError(message) => write!(f, "Build error: {}", message),
            Error::IoError(message) => write!(f, "IO error: {}", message),
            Error::CloudSyncError(message) => write!(f, "Cloud sync error: {}", message),
            Error::CacheError(message) => write!(f, "Cache error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

impl From<CredentialsError> for Error {
    fn from(err: CredentialsError) -> Self {
        Error::CredentialsError(err.to_string())
    }
}

impl From<ExecutableRunnerError> for Error {
    fn from(err: ExecutableRunnerError) -> Self {
        Error::BuildError(err.to_string())
    }
}

impl From<CloudStorageError> for Error {
    fn from(err: CloudStorageError) -> Self {
        Error::CloudSyncError(err.to_string())
    }
}

impl From<CdnCacheError> for Error {
    fn from(err: CdnCacheError) -> Self {
        Error::CacheError(err.to_string())
    }
}
