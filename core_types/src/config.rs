use std::{collections::HashSet, fmt, path::Path, path::PathBuf};

use serde::Deserialize;

/// Region used when neither the options nor the environment name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Fields that must be present and non-empty for a deploy to start.
pub const MANDATORY_OPTIONS: [&str; 4] = ["ID", "SECRET", "BUCKET_NAME", "DEPLOY_FOLDER_PATH"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Mandatory fields missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid cache configuration: {0}")]
    InvalidCache(String),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw deploy options as written by the user.
///
/// Every field is optional here; [`DeployConfig::try_from`] checks that the
/// mandatory ones are set before anything touches the network.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DeployOptions {
    pub id: Option<String>,
    pub secret: Option<String>,
    pub bucket_name: Option<String>,
    pub deploy_folder_path: Option<String>,
    pub build_cmd: Option<String>,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    pub cross_account_role: Option<String>,
    pub cache: Option<CacheOptions>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CacheOptions {
    pub id: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    pub quantity: Option<i32>,
}

impl DeployOptions {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.id,
            &self.secret,
            &self.bucket_name,
            &self.deploy_folder_path,
        ];
        MANDATORY_OPTIONS
            .iter()
            .zip(values)
            .filter(|(_, value)| non_empty(value).is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Validated, immutable configuration for one deploy invocation.
#[derive(Clone, PartialEq)]
pub struct DeployConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    pub deploy_folder_path: PathBuf,
    pub build_cmd: Option<String>,
    pub ignore_files: HashSet<String>,
    pub cross_account_role: Option<String>,
    pub cache: Option<CacheConfig>,
    pub region: String,
    pub endpoint_url: Option<String>,
}

/// CDN distribution and the path patterns to invalidate on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub distribution_id: String,
    pub paths: Vec<String>,
    pub quantity: i32,
}

impl TryFrom<DeployOptions> for DeployConfig {
    type Error = ConfigError;

    fn try_from(options: DeployOptions) -> Result<Self, ConfigError> {
        let missing = options.missing_fields();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        let cache = options.cache.map(CacheConfig::try_from).transpose()?;

        Ok(DeployConfig {
            access_key_id: options.id.unwrap_or_default(),
            secret_access_key: options.secret.unwrap_or_default(),
            bucket_name: options.bucket_name.unwrap_or_default(),
            deploy_folder_path: PathBuf::from(options.deploy_folder_path.unwrap_or_default()),
            build_cmd: non_empty(&options.build_cmd),
            ignore_files: options.ignore_files.into_iter().collect(),
            cross_account_role: non_empty(&options.cross_account_role),
            cache,
            region: non_empty(&options.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: non_empty(&options.endpoint_url),
        })
    }
}

impl TryFrom<CacheOptions> for CacheConfig {
    type Error = ConfigError;

    fn try_from(options: CacheOptions) -> Result<Self, ConfigError> {
        let distribution_id = non_empty(&options.id)
            .ok_or_else(|| ConfigError::InvalidCache("CACHE.ID is missing".to_string()))?;

        if options.paths.is_empty() {
            return Err(ConfigError::InvalidCache(
                "CACHE.PATHS must name at least one path".to_string(),
            ));
        }

        let quantity = match options.quantity {
            Some(quantity) => quantity,
            None => i32::try_from(options.paths.len())
                .map_err(|_| ConfigError::InvalidCache("too many CACHE.PATHS".to_string()))?,
        };

        Ok(CacheConfig {
            distribution_id,
            paths: options.paths,
            quantity,
        })
    }
}

// Keep the secret out of logs.
impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("deploy_folder_path", &self.deploy_folder_path)
            .field("build_cmd", &self.build_cmd)
            .field("ignore_files", &self.ignore_files)
            .field("cross_account_role", &self.cross_account_role)
            .field("cache", &self.cache)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"{
        "ID": "AKIAEXAMPLE",
        "SECRET": "secret",
        "BUCKET_NAME": "my-site",
        "DEPLOY_FOLDER_PATH": "dist/",
        "BUILD_CMD": "npm run build",
        "IGNORE_FILES": [".DS_Store", "node_modules"],
        "CROSS_ACCOUNT_ROLE": "arn:aws:iam::123456789012:role/deploy",
        "CACHE": { "ID": "E2QWRUHEXAMPLE", "PATHS": ["/*"], "QUANTITY": 1 }
    }"#;

    fn minimal_options() -> DeployOptions {
        DeployOptions {
            id: Some("key".to_string()),
            secret: Some("secret".to_string()),
            bucket_name: Some("bucket".to_string()),
            deploy_folder_path: Some("dist".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_full_config() {
        let options = DeployOptions::from_json_str(FULL_CONFIG).unwrap();
        let config = DeployConfig::try_from(options).unwrap();

        assert_eq!(config.access_key_id, "AKIAEXAMPLE");
        assert_eq!(config.bucket_name, "my-site");
        assert_eq!(config.deploy_folder_path, PathBuf::from("dist/"));
        assert_eq!(config.build_cmd.as_deref(), Some("npm run build"));
        assert!(config.ignore_files.contains("node_modules"));
        assert_eq!(config.ignore_files.len(), 2);
        assert_eq!(
            config.cross_account_role.as_deref(),
            Some("arn:aws:iam::123456789012:role/deploy")
        );
        assert_eq!(
            config.cache,
            Some(CacheConfig {
                distribution_id: "E2QWRUHEXAMPLE".to_string(),
                paths: vec!["/*".to_string()],
                quantity: 1,
            })
        );
        assert_eq!(config.region, DEFAULT_REGION);
    }

    #[test]
    fn test_each_mandatory_field_is_required() {
        for field in MANDATORY_OPTIONS {
            let mut options = minimal_options();
            match field {
                "ID" => options.id = None,
                "SECRET" => options.secret = Some(String::new()),
                "BUCKET_NAME" => options.bucket_name = None,
                "DEPLOY_FOLDER_PATH" => options.deploy_folder_path = Some("  ".to_string()),
                _ => unreachable!(),
            }

            match DeployConfig::try_from(options) {
                Err(ConfigError::MissingFields(missing)) => assert_eq!(missing, vec![field]),
                other => panic!("Expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let err = DeployConfig::try_from(DeployOptions::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mandatory fields missing: ID, SECRET, BUCKET_NAME, DEPLOY_FOLDER_PATH"
        );
    }

    #[test]
    fn test_empty_optional_fields_are_treated_as_unset() {
        let options = DeployOptions {
            build_cmd: Some(String::new()),
            cross_account_role: Some(String::new()),
            ..minimal_options()
        };
        let config = DeployConfig::try_from(options).unwrap();

        assert!(config.build_cmd.is_none());
        assert!(config.cross_account_role.is_none());
        assert!(config.cache.is_none());
        assert!(config.ignore_files.is_empty());
    }

    #[test]
    fn test_cache_quantity_defaults_to_path_count() {
        let options = DeployOptions {
            cache: Some(CacheOptions {
                id: Some("DIST".to_string()),
                paths: vec!["/index.html".to_string(), "/css/*".to_string()],
                quantity: None,
            }),
            ..minimal_options()
        };
        let config = DeployConfig::try_from(options).unwrap();
        assert_eq!(config.cache.unwrap().quantity, 2);
    }

    #[test]
    fn test_cache_without_distribution_is_rejected() {
        let options = DeployOptions {
            cache: Some(CacheOptions {
                id: None,
                paths: vec!["/*".to_string()],
                quantity: Some(1),
            }),
            ..minimal_options()
        };
        assert!(matches!(
            DeployConfig::try_from(options),
            Err(ConfigError::InvalidCache(_))
        ));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = DeployConfig::try_from(minimal_options()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.json");
        std::fs::write(&path, FULL_CONFIG).unwrap();

        let options = DeployOptions::from_file(&path).unwrap();
        assert_eq!(options.bucket_name.as_deref(), Some("my-site"));

        let missing = DeployOptions::from_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
