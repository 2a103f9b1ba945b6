pub mod config;
pub mod events;

pub use config::{CacheConfig, CacheOptions, ConfigError, DeployConfig, DeployOptions};
pub use events::DeployEvent;

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Used for session names and caller
/// references, which only need to be distinct between runs.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
