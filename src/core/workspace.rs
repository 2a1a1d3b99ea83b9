//! Workspace housekeeping
//!
//! Keeps the local data directory out of version control by appending an
//! entry to the ignore file the first time a download runs.

use crate::domain::errors::TripdataError;
use crate::domain::Result;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

const SECTION_HEADER: &str = "# Data directory";

/// The ignore-file entry for `data_dir`, relative to the ignore file's directory
///
/// Always ends with a slash. Returns `None` when the data directory is not
/// below the ignore file's directory, since no pattern in that file could
/// match it.
pub fn ignore_entry(data_dir: &Path, ignore_file: &Path) -> Option<String> {
    let ignore_file = normalize(&absolute(ignore_file));
    let base = ignore_file.parent()?;
    let dir = normalize(&absolute(data_dir));

    let relative = dir.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("{}/", parts.join("/")))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Resolve `.` and `..` lexically; the paths may not exist yet
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Append `entry` to `ignore_file` unless a line already matches it
///
/// Missing files are created. Existing content is never rewritten, only
/// appended to.
///
/// # Returns
///
/// `true` if the entry was added, `false` if it was already present
///
/// # Errors
///
/// Returns [`TripdataError::Io`] if the file cannot be read or written
pub fn ensure_ignored(ignore_file: &Path, entry: &str) -> Result<bool> {
    let content = match fs::read_to_string(ignore_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(TripdataError::Io(format!(
                "Failed to read {}: {e}",
                ignore_file.display()
            )))
        }
    };

    let bare = entry.trim_end_matches('/');
    if content
        .lines()
        .map(str::trim)
        .any(|line| line == entry || line == bare)
    {
        return Ok(false);
    }

    let mut block = String::new();
    if !content.is_empty() {
        if !content.ends_with('\n') {
            block.push('\n');
        }
        block.push('\n');
    }
    block.push_str(SECTION_HEADER);
    block.push('\n');
    block.push_str(entry);
    block.push('\n');

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(ignore_file)
        .map_err(|e| {
            TripdataError::Io(format!("Failed to open {}: {e}", ignore_file.display()))
        })?;
    file.write_all(block.as_bytes()).map_err(|e| {
        TripdataError::Io(format!("Failed to write {}: {e}", ignore_file.display()))
    })?;

    tracing::info!(file = %ignore_file.display(), entry = %entry, "Added data directory to ignore file");
    Ok(true)
}
