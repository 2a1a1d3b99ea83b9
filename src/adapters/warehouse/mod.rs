//! Analytical store adapters
//!
//! - [`traits`] - The [`LoadTarget`] trait the coordinator writes through
//! - [`duckdb`] - DuckDB file database implementation

pub mod duckdb;
pub mod traits;

pub use self::duckdb::DuckDbWarehouse;
pub use traits::{LoadTarget, TableRowCount};
