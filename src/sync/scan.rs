//! Source document discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::sync::types::{SyncError, SyncResult};

pub const XML_EXTENSION: &str = ".xml";
pub const JSON_EXTENSION: &str = ".json";

fn name_ends_with(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(suffix))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Enumerate the metadata files under `path`, sorted by full path.
///
/// - A file is returned on its own.
/// - A directory scanned flat yields its `*.xml` and `*.json` files.
/// - A directory scanned recursively yields every `*.xml` file in the tree.
///   JSON files are not collected in this mode; their count is logged.
///
/// # Errors
///
/// Returns [`SyncError::PathNotFound`] if `path` does not exist, or an IO
/// error if a flat directory cannot be listed.
pub fn scan(path: &Path, recursive: bool) -> SyncResult<Vec<PathBuf>> {
    if !path.exists() {
        return Err(SyncError::PathNotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = if recursive {
        scan_tree(path)
    } else {
        scan_flat(path)?
    };

    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    debug!(count = files.len(), recursive, "Scanned {}", path.display());
    Ok(files)
}

fn scan_flat(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || is_hidden(&path) {
            continue;
        }
        if name_ends_with(&path, XML_EXTENSION) || name_ends_with(&path, JSON_EXTENSION) {
            files.push(path);
        }
    }
    Ok(files)
}

fn scan_tree(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut skipped_json = 0usize;

    for entry in WalkDir::new(root).into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!("Skipping unreadable entry: {err}");
            None
        }
    }) {
        // Links are not followed as directories, but a link to a file counts.
        let path = entry.path();
        if entry.file_type().is_dir() || !path.is_file() {
            continue;
        }
        if name_ends_with(path, XML_EXTENSION) {
            files.push(path.to_path_buf());
        } else if name_ends_with(path, JSON_EXTENSION) {
            skipped_json += 1;
        }
    }

    if skipped_json > 0 {
        warn!(
            skipped = skipped_json,
            "Recursive scan only collects {XML_EXTENSION} files; JSON files were not loaded"
        );
    }
    files
}
