//! Atomic file writes.
//!
//! Content goes to a sibling `<name>.tmp` file, is synced to disk, then
//! renamed over the target. A failed write removes the temp file and leaves
//! whatever was at the target untouched.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sync::types::{SyncError, SyncResult};

/// Sibling temp path used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("out"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Write `content` to `path` atomically.
///
/// The parent directory must exist.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed.
pub fn atomic_write(path: &Path, content: &[u8]) -> SyncResult<()> {
    let temp = temp_path(path);

    let result = write_synced(&temp, content).and_then(|()| fs::rename(&temp, path));
    if let Err(source) = result {
        // Never touch `path` itself here; it may be a pre-existing entry.
        let _ = fs::remove_file(&temp);
        return Err(SyncError::io(path, source));
    }

    Ok(())
}
