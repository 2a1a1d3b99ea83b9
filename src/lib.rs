// tripdata - NYC taxi trip data downloader
// Copyright (c) 2025 Tripdata Contributors
// Licensed under the MIT License

//! # tripdata - NYC taxi trip data acquisition
//!
//! tripdata downloads the monthly NYC taxi trip archives, converts each one
//! to Parquet and loads it into a local DuckDB warehouse, so downstream SQL
//! models always see consistent source tables.
//!
//! ## Overview
//!
//! - **Planning** a deduplicated file list from declarative dataset groups
//! - **Fetching** archives concurrently with retries and atomic renames
//! - **Converting** CSV archives to Parquet
//! - **Loading** each file as an idempotent table partition
//! - **Stopping** early when too many files fail in a row
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Planning, conversion and download orchestration
//! - [`adapters`] - External integrations (HTTP archive, DuckDB warehouse)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tripdata::config::load_config;
//! use tripdata::core::plan::{expand, filter_plan};
//! use tripdata::domain::{Category, Selector};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("download_config.toml")?;
//! let plan = expand(&config.groups, &config.settings.layout());
//! let plan = filter_plan(plan, &Selector::new().with_category(Category::Green));
//!
//! for descriptor in &plan {
//!     println!("{} -> {}", descriptor.remote_url, descriptor.columnar_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible library calls return [`domain::Result`], whose error type is
//! [`domain::TripdataError`]. Per-file failures never escape a run; they are
//! recorded as failed outcomes in the [`core::download::RunReport`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
