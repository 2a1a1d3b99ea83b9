//! External system integrations for tripdata.
//!
//! - [`archive`] - HTTP release archive that publishes the raw CSV files
//! - [`warehouse`] - DuckDB warehouse that receives the Parquet partitions
//!
//! Both sides sit behind traits ([`archive::ArtifactFetcher`],
//! [`warehouse::LoadTarget`]) so the coordinator can be driven by test doubles.

pub mod archive;
pub mod warehouse;
