//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::TripdataConfig;
use crate::core::plan::validate_groups;
use crate::domain::errors::TripdataError;
use crate::domain::group::DatasetGroup;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// A configuration that passed every check
///
/// Holds the parsed settings together with the validated dataset groups, so
/// callers never see groups that could still contain bad values.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed and validated settings
    pub settings: TripdataConfig,

    /// Validated dataset groups in declaration order
    pub groups: Vec<DatasetGroup>,
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TripdataConfig
/// 4. Applies environment variable overrides (TRIPDATA_* prefix)
/// 5. Validates the settings
/// 6. Validates every dataset group, collecting all violations
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns [`TripdataError::ConfigFile`] if the file is missing, unreadable,
/// malformed or has invalid settings, and
/// [`TripdataError::InvalidConfiguration`] listing every dataset group
/// violation.
///
/// # Examples
///
/// ```no_run
/// use tripdata::config::loader::load_config;
///
/// let config = load_config("download_config.toml").expect("Failed to load config");
/// println!("{} dataset groups", config.groups.len());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let settings = load_settings(path)?;
    let groups = validate_groups(settings.datasets.as_deref())?;
    Ok(LoadedConfig { settings, groups })
}

/// Loads and validates the settings without touching the dataset groups
///
/// # Errors
///
/// Same as [`load_config`] except that dataset groups are not checked.
pub fn load_settings(path: impl AsRef<Path>) -> Result<TripdataConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TripdataError::ConfigFile(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TripdataError::ConfigFile(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TripdataConfig = toml::from_str(&contents)
        .map_err(|e| TripdataError::ConfigFile(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TripdataError::ConfigFile(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TripdataError::ConfigFile(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TripdataError::ConfigFile(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the TRIPDATA_* prefix
///
/// Variables follow the pattern `TRIPDATA_<SECTION>_<KEY>`, for example
/// `TRIPDATA_DOWNLOAD_CONCURRENCY`. Numeric overrides that do not parse are
/// rejected rather than ignored.
fn apply_env_overrides(config: &mut TripdataConfig) -> Result<()> {
    if let Ok(val) = std::env::var("TRIPDATA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("TRIPDATA_DOWNLOAD_BASE_URL") {
        config.download.base_url = val;
    }
    if let Ok(val) = std::env::var("TRIPDATA_DOWNLOAD_DATA_DIR") {
        config.download.data_dir = val.into();
    }
    if let Ok(val) = std::env::var("TRIPDATA_DOWNLOAD_CONCURRENCY") {
        config.download.concurrency = parse_override("TRIPDATA_DOWNLOAD_CONCURRENCY", &val)?;
    }
    if let Ok(val) = std::env::var("TRIPDATA_DOWNLOAD_MAX_CONSECUTIVE_FAILURES") {
        config.download.max_consecutive_failures =
            parse_override("TRIPDATA_DOWNLOAD_MAX_CONSECUTIVE_FAILURES", &val)?;
    }

    if let Ok(val) = std::env::var("TRIPDATA_WAREHOUSE_PATH") {
        config.warehouse.path = val.into();
    }
    if let Ok(val) = std::env::var("TRIPDATA_WAREHOUSE_SCHEMA") {
        config.warehouse.schema = val;
    }

    if let Ok(val) = std::env::var("TRIPDATA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("TRIPDATA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        TripdataError::ConfigFile(format!("Invalid value '{value}' for {name}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("TRIPDATA_TEST_SUBST_VAR", "test_value");
        let input = "data_dir = \"${TRIPDATA_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "data_dir = \"test_value\"\n");
        std::env::remove_var("TRIPDATA_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("TRIPDATA_TEST_MISSING_VAR");
        let input = "data_dir = \"${TRIPDATA_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("TRIPDATA_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("TRIPDATA_TEST_COMMENTED_VAR");
        let input = "# data_dir = \"${TRIPDATA_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent-download-config.toml").unwrap_err();
        assert!(matches!(err, TripdataError::ConfigFile(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let file = write_config(
            r#"
[download]
data_dir = "taxi-data"
concurrency = 2

[warehouse]
schema = "staging"

[[datasets]]
taxi_types = ["yellow", "green"]
years = [2019]
months = [1, 2, 3]
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.settings.download.concurrency, 2);
        assert_eq!(config.settings.warehouse.schema, "staging");
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].len(), 6);
    }

    #[test]
    fn test_load_config_invalid_groups_are_aggregated() {
        let file = write_config(
            r#"
[[datasets]]
taxi_types = ["red"]
years = [2019]
months = [13]
"#,
        );

        match load_config(file.path()).unwrap_err() {
            TripdataError::InvalidConfiguration(err) => assert_eq!(err.violations().len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_config_bad_settings() {
        let file = write_config(
            r#"
[download]
concurrency = 0

[[datasets]]
taxi_types = ["yellow"]
years = [2019]
months = [1]
"#,
        );

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("download.concurrency"));
    }
}
