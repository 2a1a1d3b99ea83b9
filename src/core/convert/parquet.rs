//! CSV to Parquet conversion through an in-memory DuckDB
//!
//! Column names and inferred types come from DuckDB's CSV sniffer; gzip
//! compression is detected from the file extension. Output is written to
//! `<columnar>.part` and renamed into place once DuckDB has finished.

use super::ArtifactConverter;
use crate::domain::descriptor::{partial_path, FileDescriptor};
use crate::domain::errors::{ConversionError, ConversionFailure};
use crate::domain::outcome::StageStatus;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::{Path, PathBuf};

/// Converter backed by DuckDB's `COPY ... TO ... (FORMAT PARQUET)`
#[derive(Debug, Clone)]
pub struct DuckDbConverter {
    remove_raw: bool,
}

impl DuckDbConverter {
    /// Create a converter
    ///
    /// # Arguments
    ///
    /// * `remove_raw` - Delete the raw artifact after a successful conversion
    pub fn new(remove_raw: bool) -> Self {
        Self { remove_raw }
    }
}

#[async_trait]
impl ArtifactConverter for DuckDbConverter {
    async fn convert(
        &self,
        descriptor: &FileDescriptor,
        force: bool,
    ) -> Result<StageStatus, ConversionError> {
        let fail = |cause| ConversionError::new(descriptor.id, cause);

        if !descriptor.raw_path.exists() {
            if descriptor.columnar_path.exists() {
                return Ok(StageStatus::Skipped);
            }
            return Err(fail(ConversionFailure::MissingInput(
                descriptor.raw_path.display().to_string(),
            )));
        }

        if !force && is_up_to_date(&descriptor.raw_path, &descriptor.columnar_path) {
            tracing::debug!(
                file = %descriptor.columnar_file_name(),
                "Columnar file is up to date, skipping conversion"
            );
            return Ok(StageStatus::Skipped);
        }

        let raw = descriptor.raw_path.clone();
        let columnar = descriptor.columnar_path.clone();
        tokio::task::spawn_blocking(move || write_parquet(&raw, &columnar))
            .await
            .map_err(|e| fail(ConversionFailure::Engine(format!("conversion task failed: {e}"))))?
            .map_err(fail)?;

        tracing::info!(file = %descriptor.columnar_file_name(), "Converted to parquet");

        if self.remove_raw {
            if let Err(e) = tokio::fs::remove_file(&descriptor.raw_path).await {
                tracing::warn!(
                    path = %descriptor.raw_path.display(),
                    error = %e,
                    "Failed to remove raw artifact after conversion"
                );
            }
        }

        Ok(StageStatus::Completed)
    }
}

/// Columnar output exists and is at least as new as the raw input
fn is_up_to_date(raw: &Path, columnar: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified()).ok();

    match (modified(raw), modified(columnar)) {
        (Some(raw), Some(columnar)) => columnar >= raw,
        (None, Some(_)) => true,
        _ => false,
    }
}

fn write_parquet(raw: &Path, columnar: &Path) -> Result<(), ConversionFailure> {
    let partial: PathBuf = partial_path(columnar);
    if partial.exists() {
        std::fs::remove_file(&partial).map_err(|e| ConversionFailure::Io(e.to_string()))?;
    }

    let result = copy_to_parquet(raw, &partial).and_then(|()| {
        std::fs::rename(&partial, columnar).map_err(|e| ConversionFailure::Io(e.to_string()))
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

fn copy_to_parquet(raw: &Path, target: &Path) -> Result<(), ConversionFailure> {
    let engine = |e: duckdb::Error| ConversionFailure::Engine(e.to_string());

    let conn = Connection::open_in_memory().map_err(engine)?;
    conn.execute_batch(&format!(
        "COPY (SELECT * FROM read_csv_auto({})) TO {} (FORMAT PARQUET)",
        sql_literal(raw),
        sql_literal(target)
    ))
    .map_err(engine)
}

/// Single-quoted SQL string literal for a path
pub(crate) fn sql_literal(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}
