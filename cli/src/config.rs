use std::path::Path;

use core_types::{ConfigError, DeployConfig, DeployOptions};

/// Read a deploy configuration file, filling missing credentials and region
/// from the environment.
pub fn load_config(path: &Path) -> Result<DeployConfig, ConfigError> {
    let mut options = DeployOptions::from_file(path)?;
    apply_env_fallbacks(&mut options, |name| std::env::var(name).ok());
    DeployConfig::try_from(options)
}

fn apply_env_fallbacks<F>(options: &mut DeployOptions, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    fill_from_env(&mut options.id, "AWS_ACCESS_KEY_ID", &lookup);
    fill_from_env(&mut options.secret, "AWS_SECRET_ACCESS_KEY", &lookup);
    fill_from_env(&mut options.region, "AWS_REGION", &lookup);
}

fn fill_from_env<F>(value: &mut Option<String>, name: &str, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if !value.as_deref().is_none_or(str::is_empty) {
        return;
    }
    if let Some(env_value) = lookup(name).filter(|v| !v.is_empty()) {
        tracing::debug!("Using {} from environment", name);
        *value = Some(env_value);
    }
}
