//! Status command implementation
//!
//! This module implements the `status` command: local artifact counts per
//! taxi type and row counts of the warehouse tables.

use super::{EXIT_CONFIG, EXIT_INIT, EXIT_OK};
use crate::adapters::warehouse::{DuckDbWarehouse, LoadTarget};
use crate::config::load_settings;
use crate::domain::descriptor::{COLUMNAR_EXTENSION, RAW_EXTENSION};
use crate::domain::{Category, DataLayout};
use clap::Args;
use std::path::Path;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show only this taxi type
    #[arg(long)]
    pub taxi_type: Option<Category>,
}

/// Local artifact counts for one taxi type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFiles {
    /// Raw archives still on disk
    pub raw: usize,
    /// Parquet files
    pub columnar: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking download status");

        println!("📊 Download Status");
        println!();

        // Dataset groups are irrelevant here, only the layout is needed
        let settings = match load_settings(config_path) {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(EXIT_CONFIG);
            }
        };
        let layout = settings.layout();

        println!("Local files ({}):", layout.data_dir().display());
        println!("{:<10} {:>10} {:>10}", "Type", "Parquet", "Raw");
        println!("{}", "-".repeat(32));
        for category in Category::ALL {
            if self.taxi_type.is_some_and(|only| only != category) {
                continue;
            }
            let files = count_local_files(&layout, category);
            println!("{:<10} {:>10} {:>10}", category, files.columnar, files.raw);
        }
        println!();

        if !settings.warehouse.path.exists() {
            println!(
                "No warehouse at {} yet. Run 'tripdata download' to create it.",
                settings.warehouse.path.display()
            );
            return Ok(EXIT_OK);
        }

        let warehouse = match DuckDbWarehouse::open(&settings.warehouse) {
            Ok(w) => w,
            Err(e) => {
                println!("❌ Failed to open warehouse");
                println!("   Error: {}", e);
                return Ok(EXIT_INIT);
            }
        };

        let counts = match warehouse.table_row_counts().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to read warehouse tables");
                println!("   Error: {}", e);
                return Ok(EXIT_INIT);
            }
        };

        if counts.is_empty() {
            println!("Warehouse {} has no tables yet.", settings.warehouse.path.display());
            return Ok(EXIT_OK);
        }

        println!("Warehouse tables ({}):", settings.warehouse.path.display());
        println!("{:<30} {:>15}", "Table", "Rows");
        println!("{}", "-".repeat(46));
        for count in counts {
            println!("{:<30} {:>15}", count.table, count.rows);
        }
        println!();
        Ok(EXIT_OK)
    }
}

/// Count raw and Parquet artifacts under the category directory
pub fn count_local_files(layout: &DataLayout, category: Category) -> LocalFiles {
    let dir = layout.category_dir(category);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return LocalFiles::default();
    };

    let mut files = LocalFiles::default();
    for entry in entries.flatten() {
        let path = entry.path();
        if has_suffix(&path, &format!(".{COLUMNAR_EXTENSION}")) {
            files.columnar += 1;
        } else if has_suffix(&path, &format!(".{RAW_EXTENSION}")) {
            files.raw += 1;
        }
    }
    files
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_count_local_files() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::new("https://archive.example.com", dir.path(), "prod");
        let yellow = layout.category_dir(Category::Yellow);
        std::fs::create_dir_all(&yellow).unwrap();
        std::fs::write(yellow.join("yellow_tripdata_2019-01.parquet"), b"").unwrap();
        std::fs::write(yellow.join("yellow_tripdata_2019-02.parquet"), b"").unwrap();
        std::fs::write(yellow.join("yellow_tripdata_2019-03.csv.gz"), b"").unwrap();
        std::fs::write(yellow.join("yellow_tripdata_2019-04.csv.gz.part"), b"").unwrap();

        assert_eq!(
            count_local_files(&layout, Category::Yellow),
            LocalFiles { raw: 1, columnar: 2 }
        );
        assert_eq!(count_local_files(&layout, Category::Green), LocalFiles::default());
    }
}
