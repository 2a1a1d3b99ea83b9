//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the configuration file and previewing the size of the plan it produces.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::core::plan::expand;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        let settings = &config.settings;
        let plan = expand(&config.groups, &settings.layout());

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", settings.application.log_level);
        println!("  Archive: {}", settings.download.base_url);
        println!("  Data Directory: {}", settings.download.data_dir.display());
        println!("  Concurrency: {}", settings.download.concurrency);
        println!(
            "  Max Consecutive Failures: {}",
            settings.download.max_consecutive_failures
        );
        println!("  Max Retries: {}", settings.download.retry.max_retries);
        println!("  Warehouse: {}", settings.warehouse.path.display());
        println!("  Schema: {}", settings.warehouse.schema);
        println!("  Dataset Groups: {}", config.groups.len());
        println!("  Planned Files: {}", plan.len());
        println!();
        Ok(EXIT_OK)
    }
}
