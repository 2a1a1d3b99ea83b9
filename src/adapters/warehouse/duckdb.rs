//! DuckDB load target
//!
//! One file database, one connection behind a mutex. Each load runs in a
//! single transaction that replaces the `(source_year, source_month)`
//! partition of the category table, so reloading a file never duplicates
//! rows and a failed load leaves every partition as it was.

use super::traits::{LoadTarget, TableRowCount};
use crate::config::schema::WarehouseConfig;
use crate::core::convert::parquet::sql_literal;
use crate::domain::descriptor::FileDescriptor;
use crate::domain::errors::{LoadError, LoadFailure, TripdataError};
use crate::domain::Result;
use async_trait::async_trait;
use duckdb::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Partition key columns appended to every category table
const PARTITION_COLUMNS: [&str; 2] = ["source_year", "source_month"];

/// DuckDB-backed [`LoadTarget`]
#[derive(Clone)]
pub struct DuckDbWarehouse {
    conn: Arc<Mutex<Connection>>,
    schema: String,
}

impl DuckDbWarehouse {
    /// Open (or create) the database file and its schema
    ///
    /// # Errors
    ///
    /// Returns [`TripdataError::Initialization`] if the file cannot be opened
    /// or the schema cannot be created.
    pub fn open(config: &WarehouseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.path).map_err(|e| {
            TripdataError::Initialization(format!(
                "Failed to open warehouse {}: {e}",
                config.path.display()
            ))
        })?;

        conn.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {}", config.schema))
            .map_err(|e| {
                TripdataError::Initialization(format!(
                    "Failed to create schema {}: {e}",
                    config.schema
                ))
            })?;

        tracing::info!(
            path = %config.path.display(),
            schema = %config.schema,
            "Warehouse ready"
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            schema: config.schema.clone(),
        })
    }
}

#[async_trait]
impl LoadTarget for DuckDbWarehouse {
    async fn load(&self, descriptor: &FileDescriptor) -> std::result::Result<u64, LoadError> {
        let conn = Arc::clone(&self.conn);
        let schema = self.schema.clone();
        let owned = descriptor.clone();

        let rows = tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| {
                LoadFailure::Unavailable("warehouse connection poisoned".to_string())
            })?;
            load_partition(&mut conn, &schema, &owned).map_err(classify)
        })
        .await
        .map_err(|e| {
            LoadError::new(
                descriptor.id,
                LoadFailure::Unavailable(format!("load task failed: {e}")),
            )
        })?
        .map_err(|cause| LoadError::new(descriptor.id, cause))?;

        tracing::info!(
            table = %descriptor.table_name,
            category = %descriptor.category(),
            year = %descriptor.year(),
            month = %descriptor.month(),
            rows = rows,
            "Loaded partition"
        );

        Ok(rows)
    }

    async fn table_row_counts(&self) -> Result<Vec<TableRowCount>> {
        let conn = Arc::clone(&self.conn);
        let schema = self.schema.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| TripdataError::Warehouse("connection poisoned".to_string()))?;
            row_counts(&conn, &schema)
                .map_err(|e| TripdataError::Warehouse(format!("Failed to count rows: {e}")))
        })
        .await
        .map_err(|e| TripdataError::Warehouse(format!("Row count task failed: {e}")))?
    }
}

fn load_partition(
    conn: &mut Connection,
    schema: &str,
    descriptor: &FileDescriptor,
) -> std::result::Result<u64, duckdb::Error> {
    let table = &descriptor.table_name;
    let source = sql_literal(&descriptor.columnar_path);
    let year = i32::from(descriptor.year().get());
    let month = i32::from(descriptor.month().get());
    let tagged = format!(
        "SELECT *, {year}::INTEGER AS source_year, {month}::INTEGER AS source_month \
         FROM read_parquet({source})"
    );

    let tx = conn.transaction()?;

    tx.execute_batch(&format!("CREATE TABLE IF NOT EXISTS {table} AS {tagged} LIMIT 0"))?;
    add_missing_columns(&tx, schema, descriptor, &source)?;
    tx.execute(
        &format!("DELETE FROM {table} WHERE source_year = ? AND source_month = ?"),
        params![year, month],
    )?;
    tx.execute_batch(&format!("INSERT INTO {table} BY NAME {tagged}"))?;

    let rows: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE source_year = ? AND source_month = ?"),
        params![year, month],
        |row| row.get(0),
    )?;

    tx.commit()?;
    Ok(rows as u64)
}

/// Widen the table with columns that first appear in this file
///
/// Older rows read `NULL` for columns that did not exist when they were
/// loaded.
fn add_missing_columns(
    conn: &Connection,
    schema: &str,
    descriptor: &FileDescriptor,
    source: &str,
) -> std::result::Result<(), duckdb::Error> {
    let table_only = format!("{}_tripdata", descriptor.category());

    let mut stmt = conn.prepare(
        "SELECT column_name FROM information_schema.columns \
         WHERE table_schema = ? AND table_name = ?",
    )?;
    let existing: HashSet<String> = stmt
        .query_map(params![schema, table_only], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<_, _>>()?;

    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM read_parquet({source})"))?;
    let incoming: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<_, _>>()?;

    for (name, column_type) in incoming {
        if existing.contains(&name) || PARTITION_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        tracing::info!(
            table = %descriptor.table_name,
            column = %name,
            column_type = %column_type,
            "Adding new column"
        );
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN \"{}\" {column_type}",
            descriptor.table_name,
            name.replace('"', "\"\"")
        ))?;
    }

    Ok(())
}

fn row_counts(
    conn: &Connection,
    schema: &str,
) -> std::result::Result<Vec<TableRowCount>, duckdb::Error> {
    let mut stmt = conn.prepare(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = ? ORDER BY table_name",
    )?;
    let tables: Vec<String> = stmt
        .query_map(params![schema], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<_, _>>()?;

    tables
        .into_iter()
        .map(|name| {
            let rows: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {schema}.\"{}\"", name.replace('"', "\"\"")),
                [],
                |row| row.get(0),
            )?;
            Ok(TableRowCount {
                table: format!("{schema}.{name}"),
                rows: rows as u64,
            })
        })
        .collect()
}

/// Map engine errors onto load causes
fn classify(e: duckdb::Error) -> LoadFailure {
    let message = e.to_string();
    if message.contains("Binder Error") || message.contains("Conversion Error") {
        LoadFailure::SchemaMismatch(message)
    } else if message.contains("IO Error") || message.contains("Could not set lock") {
        LoadFailure::Unavailable(message)
    } else {
        LoadFailure::Query(message)
    }
}
