//! Raw to columnar conversion
//!
//! [`ArtifactConverter`] turns a downloaded raw artifact into the columnar
//! file the loader reads. [`DuckDbConverter`] is the production
//! implementation.

pub mod parquet;

pub use parquet::DuckDbConverter;

use crate::domain::descriptor::FileDescriptor;
use crate::domain::errors::ConversionError;
use crate::domain::outcome::StageStatus;
use async_trait::async_trait;

/// Converts one descriptor's raw artifact to its columnar form
#[async_trait]
pub trait ArtifactConverter: Send + Sync {
    /// Convert `descriptor.raw_path` into `descriptor.columnar_path`
    ///
    /// Returns [`StageStatus::Skipped`] when the columnar file is already up
    /// to date and `force` is false.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the input is missing or cannot be
    /// converted. Sibling conversions are unaffected.
    async fn convert(
        &self,
        descriptor: &FileDescriptor,
        force: bool,
    ) -> Result<StageStatus, ConversionError>;
}
