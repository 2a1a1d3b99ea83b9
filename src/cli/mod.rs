//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for tripdata using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// tripdata - NYC taxi trip data downloader
#[derive(Parser, Debug)]
#[command(name = "tripdata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "download_config.toml",
        env = "TRIPDATA_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRIPDATA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download, convert and load the configured trip data files
    Download(commands::download::DownloadArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show local files and warehouse tables
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Month, Year};

    #[test]
    fn test_cli_parse_download() {
        let cli = Cli::parse_from(["tripdata", "download"]);
        assert_eq!(cli.config, "download_config.toml");
        assert!(matches!(cli.command, Commands::Download(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["tripdata", "--config", "custom.toml", "download"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["tripdata", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_selector() {
        let cli = Cli::parse_from([
            "tripdata",
            "download",
            "--taxi-type",
            "green",
            "--year",
            "2020",
            "--month",
            "7",
            "--no-load",
            "--force",
        ]);
        let Commands::Download(args) = cli.command else {
            panic!("expected download command");
        };
        assert_eq!(args.taxi_type, Some(Category::Green));
        assert_eq!(args.year, Some(Year::new(2020).unwrap()));
        assert_eq!(args.month, Some(Month::new(7).unwrap()));
        assert!(args.no_load);
        assert!(args.force);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_rejects_bad_selector() {
        assert!(Cli::try_parse_from(["tripdata", "download", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["tripdata", "download", "--taxi-type", "red"]).is_err());
        assert!(Cli::try_parse_from(["tripdata", "download", "--year", "1999"]).is_err());
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["tripdata", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["tripdata", "init", "--output", "x.toml"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
