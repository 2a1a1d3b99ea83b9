//! Load target abstraction
//!
//! This module defines the trait the download coordinator uses to merge
//! columnar files into the analytical store.

use crate::domain::descriptor::FileDescriptor;
use crate::domain::errors::LoadError;
use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Row count of one table in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRowCount {
    /// Fully qualified table name
    pub table: String,

    /// Number of rows
    pub rows: u64,
}

/// Analytical store that receives columnar files
///
/// Loads must be idempotent: loading the same descriptor twice leaves the
/// table exactly as loading it once.
#[async_trait]
pub trait LoadTarget: Send + Sync {
    /// Replace the partition for `descriptor` with the rows of its columnar file
    ///
    /// Returns the number of rows now stored for that partition.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the store is unavailable or the file does
    /// not fit the table. Other partitions are left untouched.
    async fn load(&self, descriptor: &FileDescriptor) -> std::result::Result<u64, LoadError>;

    /// Row counts of every table in the target schema
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn table_row_counts(&self) -> Result<Vec<TableRowCount>>;
}
