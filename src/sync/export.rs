//! Record export to a directory of files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::model::Record;
use crate::storage::repository::{CatalogRepository, Constraint};
use crate::sync::file::atomic_write;
use crate::sync::types::{ExportCollision, ExportFailure, ExportReport, SyncError, SyncResult};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Make an identifier safe to use as a file name.
///
/// Path separators become word breaks, whitespace runs collapse to `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing
/// `.`/`_` are trimmed. An identifier with nothing left falls back to its
/// SHA-256 hex digest. The result never contains a separator and never
/// starts with `.`, so it cannot escape the export directory.
#[must_use]
pub fn sanitize_filename(identifier: &str) -> String {
    let spaced = identifier.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        format!("{:x}", Sha256::digest(identifier.as_bytes()))
    } else {
        trimmed.to_string()
    }
}

fn extension(record: &Record) -> &'static str {
    if record.is_json() { "json" } else { "xml" }
}

fn target_path(output_dir: &Path, record: &Record) -> PathBuf {
    output_dir.join(format!(
        "{}.{}",
        sanitize_filename(&record.identifier),
        extension(record)
    ))
}

/// File content for a record: the raw document, with an XML declaration
/// prepended to XML that lacks one.
fn file_content(record: &Record) -> String {
    if record.is_json() || record.raw_document.trim_start().starts_with("<?xml") {
        record.raw_document.clone()
    } else {
        format!("{XML_DECLARATION}\n{}", record.raw_document)
    }
}

/// Export engine.
pub struct Exporter<'a, R> {
    repo: &'a R,
}

impl<'a, R: CatalogRepository> Exporter<'a, R> {
    pub const fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Write every record to `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the records
    /// cannot be queried. A record that fails to write is logged, its partial
    /// output removed, and reported in [`ExportReport::failed`].
    pub fn export(&self, output_dir: &Path) -> SyncResult<ExportReport> {
        if !output_dir.exists() {
            info!("Directory {} does not exist. Creating...", output_dir.display());
        }
        fs::create_dir_all(output_dir).map_err(|e| SyncError::io(output_dir, e))?;

        let (total, records) = self.repo.query(&Constraint::All, None)?;
        info!("Found {total} records");

        let mut report = ExportReport {
            total,
            ..ExportReport::default()
        };

        // File written so far -> identifier that owns it.
        let mut owners: BTreeMap<PathBuf, &str> = BTreeMap::new();

        for record in &records {
            let path = target_path(output_dir, record);
            info!(identifier = %record.identifier, "Writing to file {}", path.display());

            match atomic_write(&path, file_content(record).as_bytes()) {
                Ok(()) => {
                    if let Some(previous) = owners.insert(path.clone(), &record.identifier) {
                        warn!(
                            identifier = %record.identifier,
                            "{} overwrites the export of record {previous}",
                            path.display()
                        );
                        report.collisions.push(ExportCollision {
                            path: path.clone(),
                            replaced: previous.to_string(),
                            by: record.identifier.clone(),
                        });
                    }
                    report.written.insert(path);
                }
                Err(err) => {
                    error!(identifier = %record.identifier, "Error writing {}: {err}", path.display());
                    report.failed.push(ExportFailure {
                        identifier: record.identifier.clone(),
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            collisions = report.collisions.len(),
            "Export complete"
        );
        Ok(report)
    }
}
