//! File descriptors and the deterministic local layout
//!
//! A [`FileDescriptor`] is a [`DescriptorId`] plus everything derived from it:
//! the remote URL, the local raw and columnar paths, and the target table.
//! All derivation goes through [`DataLayout`] so every component agrees on
//! where an artifact lives.

use super::ids::{Category, DescriptorId, Month, Year};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extension of raw artifacts as published by the archive
pub const RAW_EXTENSION: &str = "csv.gz";

/// Extension of converted columnar artifacts
pub const COLUMNAR_EXTENSION: &str = "parquet";

/// Suffix appended to a final path while it is being written
pub const PARTIAL_SUFFIX: &str = ".part";

/// Deterministic mapping from identity to URLs, paths and tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    base_url: String,
    data_dir: PathBuf,
    schema: String,
}

impl DataLayout {
    /// Create a new layout
    ///
    /// # Arguments
    ///
    /// * `base_url` - Archive root; a trailing slash is ignored
    /// * `data_dir` - Local root for raw and columnar artifacts
    /// * `schema` - Warehouse schema holding the category tables
    pub fn new(
        base_url: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        schema: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            data_dir: data_dir.into(),
            schema: schema.into(),
        }
    }

    /// Local root directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding all artifacts of one category
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.as_str())
    }

    /// Fully qualified warehouse table for a category
    pub fn table_name(&self, category: Category) -> String {
        format!("{}.{}_tripdata", self.schema, category)
    }

    /// Resolve an identity into a full descriptor
    pub fn describe(&self, id: DescriptorId) -> FileDescriptor {
        let stem = id.file_stem();
        let dir = self.category_dir(id.category);
        FileDescriptor {
            id,
            remote_url: format!(
                "{}/{}/{}.{}",
                self.base_url, id.category, stem, RAW_EXTENSION
            ),
            raw_path: dir.join(format!("{stem}.{RAW_EXTENSION}")),
            columnar_path: dir.join(format!("{stem}.{COLUMNAR_EXTENSION}")),
            table_name: self.table_name(id.category),
        }
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new(
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download",
            "data",
            "prod",
        )
    }
}

/// One concrete dataset file to acquire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescriptor {
    /// Identity `(category, year, month)`
    pub id: DescriptorId,

    /// Location of the raw artifact in the remote archive
    pub remote_url: String,

    /// Where the raw artifact is materialized locally
    pub raw_path: PathBuf,

    /// Where the columnar artifact is written
    pub columnar_path: PathBuf,

    /// Fully qualified table the rows are loaded into
    pub table_name: String,
}

impl FileDescriptor {
    /// Taxi category
    pub fn category(&self) -> Category {
        self.id.category
    }

    /// Dataset year
    pub fn year(&self) -> Year {
        self.id.year
    }

    /// Dataset month
    pub fn month(&self) -> Month {
        self.id.month
    }

    /// File name of the raw artifact
    pub fn raw_file_name(&self) -> String {
        format!("{}.{}", self.id.file_stem(), RAW_EXTENSION)
    }

    /// File name of the columnar artifact
    pub fn columnar_file_name(&self) -> String {
        format!("{}.{}", self.id.file_stem(), COLUMNAR_EXTENSION)
    }

    /// True when either the raw or the columnar artifact is on disk
    ///
    /// The raw file may already have been removed after conversion, so the
    /// columnar file alone also counts as present.
    pub fn has_local_artifact(&self) -> bool {
        self.raw_path.exists() || self.columnar_path.exists()
    }
}

/// Temporary sibling used while `path` is being written
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
