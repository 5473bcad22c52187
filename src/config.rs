//! Application configuration: data source and display settings from TOML,
//! credentials from the environment.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_CONFIG_PATH: &str = "OYATOI_CONFIG";
pub const ENV_AWS_KEY: &str = "AWS_KEY";
pub const ENV_AWS_KEY_SECRET: &str = "AWS_KEY_SECRET";
pub const ENV_AWS_REGION: &str = "AWS_REGION";

pub const DEFAULT_CONFIG_FILE_NAME: &str = "oyatoi.toml";
pub const DEFAULT_BUCKET: &str = "hired-foreigners";
pub const DEFAULT_RECORDS_KEY: &str = "df_oyatoi_simplified.csv";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    S3,
    Local,
}

/// Where the map viewport is centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewportPolicy {
    /// Fixed view over Japan, independent of filtering.
    #[default]
    Fixed,
    /// Mean of the currently filtered coordinates.
    DataMidpoint,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub bucket: String,
    pub records_key: String,
    pub boundaries_key: Option<String>,
    pub region: Option<String>,
    /// Overrides `https://{bucket}.s3.{region}.amazonaws.com`.
    pub endpoint: Option<String>,
    pub local_dir: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            records_key: DEFAULT_RECORDS_KEY.to_string(),
            boundaries_key: None,
            region: None,
            endpoint: None,
            local_dir: None,
            cache_ttl_secs: None,
        }
    }
}

impl SourceConfig {
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Exponent of the `ln(count + 1)^p` map scaling.
    pub log_power: f64,
    pub viewport: ViewportPolicy,
    pub duration_upper_limit: f64,
    pub duration_slider_max: f64,
    pub raw_row_limit: usize,
    /// Show category totals as `ln(count + 1)`.
    pub log_category_counts: bool,
    /// GeoJSON property naming each region.
    pub region_property: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            log_power: 2.0,
            viewport: ViewportPolicy::default(),
            duration_upper_limit: 10_000.0,
            duration_slider_max: 20_000.0,
            raw_row_limit: 500,
            log_category_counts: false,
            region_property: "region_eng".to_string(),
        }
    }
}

/// Access key pair for signed object store requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub display: DisplayConfig,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl AppConfig {
    /// Config file from `OYATOI_CONFIG` or `./oyatoi.toml` when present,
    /// defaults otherwise; environment credentials applied on top.
    pub fn from_default_sources() -> Result<Self, ConfigError> {
        Self::from_sources_with(|key| std::env::var(key).ok())
    }

    fn from_sources_with<F>(mut getter: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path = getter(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE_NAME));

        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(getter);
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml(&content).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })
    }

    fn apply_env<F>(&mut self, mut getter: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        let key = getter(ENV_AWS_KEY).filter(|v| !v.is_empty());
        let secret = getter(ENV_AWS_KEY_SECRET).filter(|v| !v.is_empty());
        if let (Some(access_key_id), Some(secret_access_key)) = (key, secret) {
            self.credentials = Some(Credentials {
                access_key_id,
                secret_access_key,
            });
        }
        if let Some(region) = getter(ENV_AWS_REGION).filter(|v| !v.is_empty()) {
            self.source.region = Some(region);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.display.log_power > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "display.log_power must be positive, got {}",
                self.display.log_power
            )));
        }
        if !(self.display.duration_upper_limit > 0.0) {
            return Err(ConfigError::Invalid(
                "display.duration_upper_limit must be positive".to_string(),
            ));
        }
        if self.source.kind == SourceKind::Local && self.source.local_dir.is_none() {
            return Err(ConfigError::Invalid(
                "source.local_dir is required when source.kind = \"local\"".to_string(),
            ));
        }
        Ok(())
    }

    pub fn region(&self) -> &str {
        self.source.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_published_dataset() {
        let config = AppConfig::default();
        assert_eq!(config.source.bucket, "hired-foreigners");
        assert_eq!(config.source.records_key, "df_oyatoi_simplified.csv");
        assert_eq!(config.display.log_power, 2.0);
        assert_eq!(config.display.viewport, ViewportPolicy::Fixed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [source]
            boundaries_key = "regions.geojson"
            cache_ttl_secs = 600

            [display]
            log_power = 2.5
            viewport = "data_midpoint"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.bucket, DEFAULT_BUCKET);
        assert_eq!(config.source.boundaries_key.as_deref(), Some("regions.geojson"));
        assert_eq!(config.source.cache_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.display.log_power, 2.5);
        assert_eq!(config.display.viewport, ViewportPolicy::DataMidpoint);
        assert_eq!(config.display.raw_row_limit, 500);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_toml("[display]\nlog_power = \"high\""),
            Err(ConfigError::Parse { .. })
        ));

        let config = AppConfig::from_toml("[display]\nlog_power = 0.0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AppConfig::from_toml("[source]\nkind = \"local\"").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reads_credentials_from_environment() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CONFIG_PATH, "/nonexistent/oyatoi.toml"),
            (ENV_AWS_KEY, "AKIDEXAMPLE"),
            (ENV_AWS_KEY_SECRET, "secret"),
            (ENV_AWS_REGION, "ap-northeast-1"),
        ]);
        let config =
            AppConfig::from_sources_with(|key| env.get(key).map(|v| v.to_string())).unwrap();

        let credentials = config.credentials.as_ref().unwrap();
        assert_eq!(credentials.access_key_id, "AKIDEXAMPLE");
        assert_eq!(config.region(), "ap-northeast-1");
        assert!(!format!("{credentials:?}").contains("\"secret\""));
    }

    #[test]
    fn incomplete_credentials_are_ignored() {
        let config = AppConfig::from_sources_with(|key| match key {
            ENV_CONFIG_PATH => Some("/nonexistent/oyatoi.toml".to_string()),
            ENV_AWS_KEY => Some("AKIDEXAMPLE".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.credentials.is_none());
        assert_eq!(config.region(), DEFAULT_REGION);
    }
}
