//! Configuration management for tripdata.
//!
//! # Overview
//!
//! tripdata reads a single TOML file (by default `download_config.toml`) with
//! support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TRIPDATA_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting except the dataset groups
//! - Validation that reports every dataset group problem at once
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DownloadConfig`] - Archive URL, data directory, concurrency, circuit
//!   breaker threshold, credentials lookup, retry policy
//! - [`WarehouseConfig`] - DuckDB file and schema
//! - [`LoggingConfig`] - Optional rolling file logs
//! - [`DatasetGroupConfig`] - One `[[datasets]]` entry
//!
//! # Example Configuration
//!
//! ```toml
//! [download]
//! data_dir = "data"
//! concurrency = 4
//! max_consecutive_failures = 5
//!
//! [warehouse]
//! path = "taxi_rides_ny.duckdb"
//! schema = "prod"
//!
//! [[datasets]]
//! taxi_types = ["yellow", "green"]
//! years = [2019, 2020]
//! months = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
//!
//! [[datasets]]
//! taxi_types = ["fhv"]
//! years = [2019]
//! months = [1, 2, 3]
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use tripdata::config::load_config;
//!
//! # fn example() {
//! match load_config("download_config.toml") {
//!     Ok(config) => println!("{} dataset groups", config.groups.len()),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_settings, LoadedConfig};
pub use schema::{
    ApplicationConfig, DatasetGroupConfig, DownloadConfig, LoggingConfig, RetryConfig,
    TripdataConfig, WarehouseConfig,
};
pub use secret::{secret_string, secret_token, SecretString, SecretValue};
