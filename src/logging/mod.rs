//! Logging and observability
//!
//! Human-readable console logs on stderr, plus optional JSON logs in a
//! rolling local file.
//!
//! # Example
//!
//! ```no_run
//! use tripdata::logging::init_logging;
//! use tripdata::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(category = "yellow", "Starting download");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
