//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "download_config.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing tripdata configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit the [[datasets]] groups in {}", self.output);
                println!("  2. Optionally put GITHUB_TOKEN=<token> in .env to avoid rate limits");
                println!("  3. Validate configuration: tripdata validate-config");
                println!("  4. Preview the plan: tripdata download --dry-run");
                println!("  5. Run: tripdata download");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Commented sample configuration
    pub fn sample_config() -> &'static str {
        r#"# tripdata configuration
# NYC taxi trip data: download, convert to Parquet, load into DuckDB

[application]
log_level = "info"  # trace | debug | info | warn | error

# ============================================================================
# Download
# ============================================================================
[download]
base_url = "https://github.com/DataTalksClub/nyc-tlc-data/releases/download"
data_dir = "data"

# Files processed at the same time (1-64)
concurrency = 4

# Stop dispatching after this many failures in a row
max_consecutive_failures = 5

timeout_seconds = 300
connect_timeout_seconds = 30
user_agent = "taxi-rides-ny-downloader"

# Access token: read from this environment variable, then from secrets_file
token_env_var = "GITHUB_TOKEN"
secrets_file = ".env"

# The data directory is appended to this file once
ignore_file = ".gitignore"

# Delete the .csv.gz once the Parquet file is written
remove_raw_after_convert = true

[download.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Warehouse
# ============================================================================
[warehouse]
path = "taxi_rides_ny.duckdb"
schema = "prod"

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"  # daily | hourly

# ============================================================================
# Datasets
# ============================================================================
# Each group expands to every (taxi type, year, month) combination.
# Files listed by several groups are processed once.
# Taxi types: yellow, green, fhv, fhvhv. Years: 2009-2030. Months: 1-12.

[[datasets]]
taxi_types = ["yellow", "green"]
years = [2019, 2020]
months = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
"#
    }
}
