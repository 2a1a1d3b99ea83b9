//! Configuration schema types
//!
//! This module defines the structure of `download_config.toml`. Every section
//! except `[[datasets]]` is optional and falls back to defaults that match the
//! public NYC taxi archive.

use crate::domain::descriptor::DataLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default archive root
pub const DEFAULT_BASE_URL: &str = "https://github.com/DataTalksClub/nyc-tlc-data/releases/download";

/// Main tripdata configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripdataConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Archive transfer settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Analytical store settings
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dataset groups, unvalidated
    ///
    /// `None` when the key is missing entirely; the plan validator reports that
    /// together with any per-group problems.
    #[serde(default)]
    pub datasets: Option<Vec<DatasetGroupConfig>>,
}

impl TripdataConfig {
    /// Validates every section except the dataset groups
    ///
    /// Dataset groups are validated separately so that all of their
    /// violations can be reported together.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.download.validate()?;
        self.warehouse.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Path layout derived from the download and warehouse sections
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(
            self.download.base_url.clone(),
            self.download.data_dir.clone(),
            self.warehouse.schema.clone(),
        )
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Retry configuration for archive requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Backoff before retry number `attempt` (1-based)
    ///
    /// Grows by `backoff_multiplier` per attempt and is capped at
    /// `max_delay_ms`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1) as f64;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powf(exponent);
        Duration::from_millis(delay.min(self.max_delay_ms as f64) as u64)
    }

    fn validate(&self) -> Result<(), String> {
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "download.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(
                "download.retry.max_delay_ms must be >= download.retry.initial_delay_ms"
                    .to_string(),
            );
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Archive transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root URL of the release archive
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local directory for raw and columnar artifacts
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Worker pool size
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Consecutive failed outcomes that abort the run
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: usize,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TCP/TLS connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// User-Agent header sent to the archive
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Environment variable holding the access token
    #[serde(default = "default_token_env_var")]
    pub token_env_var: String,

    /// Dotenv-style file consulted when the variable is not set
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,

    /// Ignore-list file that gets the data directory entry
    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,

    /// Delete the raw artifact once the columnar file is written
    #[serde(default = "default_true")]
    pub remove_raw_after_convert: bool,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl DownloadConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("download.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("download.base_url must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("download.base_url '{}' is not a valid URL", self.base_url));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err("download.data_dir cannot be empty".to_string());
        }

        if self.concurrency == 0 || self.concurrency > 64 {
            return Err(format!(
                "download.concurrency must be between 1 and 64, got {}",
                self.concurrency
            ));
        }

        if self.max_consecutive_failures == 0 {
            return Err("download.max_consecutive_failures must be > 0".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("download.timeout_seconds must be > 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("download.user_agent cannot be empty".to_string());
        }

        if self.token_env_var.trim().is_empty() {
            return Err("download.token_env_var cannot be empty".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }

    /// Whole-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: default_data_dir(),
            concurrency: default_concurrency(),
            max_consecutive_failures: default_max_consecutive_failures(),
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            user_agent: default_user_agent(),
            token_env_var: default_token_env_var(),
            secrets_file: default_secrets_file(),
            ignore_file: default_ignore_file(),
            remove_raw_after_convert: true,
            retry: RetryConfig::default(),
        }
    }
}

/// Analytical store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// DuckDB database file
    #[serde(default = "default_warehouse_path")]
    pub path: PathBuf,

    /// Schema holding the per-category tables
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl WarehouseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("warehouse.path cannot be empty".to_string());
        }

        if !is_sql_identifier(&self.schema) {
            return Err(format!(
                "warehouse.schema '{}' must be a plain identifier (letters, digits, underscore)",
                self.schema
            ));
        }

        Ok(())
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_warehouse_path(),
            schema: default_schema(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// One `[[datasets]]` entry as written in the file
///
/// Every field is optional and loosely typed so that missing keys and
/// out-of-range values become configuration violations instead of TOML
/// parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetGroupConfig {
    /// Taxi categories
    #[serde(default)]
    pub taxi_types: Option<Vec<String>>,

    /// Years
    #[serde(default)]
    pub years: Option<Vec<i64>>,

    /// Months
    #[serde(default)]
    pub months: Option<Vec<i64>>,
}

impl DatasetGroupConfig {
    /// Convenience constructor
    pub fn new(
        taxi_types: impl IntoIterator<Item = impl Into<String>>,
        years: impl IntoIterator<Item = i64>,
        months: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            taxi_types: Some(taxi_types.into_iter().map(Into::into).collect()),
            years: Some(years.into_iter().collect()),
            months: Some(months.into_iter().collect()),
        }
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_sql_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_concurrency() -> usize {
    4
}

fn default_max_consecutive_failures() -> usize {
    5
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "taxi-rides-ny-downloader".to_string()
}

fn default_token_env_var() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from(".env")
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(".gitignore")
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_warehouse_path() -> PathBuf {
    PathBuf::from("taxi_rides_ny.duckdb")
}

fn default_schema() -> String {
    "prod".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_fractional_multiplier() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 1.5,
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(1000));
        assert_eq!(retry.delay_for(2), Duration::from_millis(1500));
        assert_eq!(retry.delay_for(3), Duration::from_millis(2250));
        assert_eq!(retry.delay_for(4), Duration::from_millis(3375));
    }

    #[test]
    fn test_retry_delay_is_capped_for_large_attempts() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for(6), Duration::from_millis(30_000));
        assert_eq!(
            retry.delay_for(10_000),
            Duration::from_millis(retry.max_delay_ms)
        );
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_download_config_defaults() {
        let config = DownloadConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.user_agent, "taxi-rides-ny-downloader");
        assert_eq!(config.token_env_var, "GITHUB_TOKEN");
        assert!(config.remove_raw_after_convert);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_download_config_validation() {
        let mut config = DownloadConfig::default();

        config.concurrency = 0;
        assert!(config.validate().is_err());

        config.concurrency = 65;
        assert!(config.validate().is_err());

        config.concurrency = 4;
        config.max_consecutive_failures = 0;
        assert!(config.validate().is_err());

        config.max_consecutive_failures = 5;
        config.base_url = "ftp://archive.example.com".to_string();
        assert!(config
            .validate()
            .unwrap_err()
            .contains("must start with http:// or https://"));
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        assert!(config.validate().is_ok());

        config.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.backoff_multiplier = 2.0;
        config.max_delay_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_warehouse_schema_must_be_identifier() {
        let mut config = WarehouseConfig::default();
        assert!(config.validate().is_ok());

        config.schema = "prod; DROP TABLE x".to_string();
        assert!(config.validate().is_err());

        config.schema = "1prod".to_string();
        assert!(config.validate().is_err());

        config.schema = "_staging2".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dataset_group_missing_keys_deserialize() {
        let group: DatasetGroupConfig = toml::from_str("taxi_types = [\"yellow\"]").unwrap();
        assert_eq!(group.taxi_types, Some(vec!["yellow".to_string()]));
        assert!(group.years.is_none());
        assert!(group.months.is_none());
    }

    #[test]
    fn test_layout_from_config() {
        let mut config = TripdataConfig::default();
        config.download.data_dir = PathBuf::from("/tmp/taxi");
        config.warehouse.schema = "staging".to_string();

        let layout = config.layout();
        assert_eq!(layout.data_dir(), std::path::Path::new("/tmp/taxi"));
        assert_eq!(
            layout.table_name(crate::domain::Category::Green),
            "staging.green_tripdata"
        );
    }
}
