//! Core business logic for tripdata.
//!
//! # Modules
//!
//! - [`plan`] - Expands dataset groups into file descriptors and filters them
//! - [`convert`] - Turns raw CSV archives into columnar Parquet files
//! - [`download`] - Bounded-concurrency orchestration with a circuit breaker
//! - [`workspace`] - Ignore-file housekeeping for the data directory
//!
//! # Download Workflow
//!
//! 1. **Expand**: Validate dataset groups and build the deduplicated plan
//! 2. **Filter**: Narrow the plan with the command-line selector
//! 3. **Fetch**: Stream each missing archive to disk
//! 4. **Convert**: Write a Parquet file next to the raw archive
//! 5. **Load**: Replace the matching partition in the warehouse
//! 6. **Report**: Summarize outcomes in completion order
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tripdata::adapters::archive::HttpArchiveFetcher;
//! use tripdata::config::load_config;
//! use tripdata::core::convert::DuckDbConverter;
//! use tripdata::core::download::{CoordinatorOptions, DownloadCoordinator};
//! use tripdata::core::plan::expand;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("download_config.toml")?;
//! let plan = expand(&config.groups, &config.settings.layout());
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let options = CoordinatorOptions {
//!     load: false,
//!     ..CoordinatorOptions::from_config(&config.settings.download)
//! };
//! let coordinator = DownloadCoordinator::new(
//!     Arc::new(HttpArchiveFetcher::new(&config.settings.download, None)?),
//!     Arc::new(DuckDbConverter::new(true)),
//!     None,
//!     options,
//!     shutdown_rx,
//! )?;
//!
//! let report = coordinator.run(plan).await;
//! println!("Succeeded: {}", report.succeeded());
//! println!("Failed: {}", report.failed());
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod download;
pub mod plan;
pub mod workspace;
