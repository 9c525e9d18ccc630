//! Record loading: scan, decode, extract, reconcile.
//!
//! Files are processed one at a time in scan order. Each record is first
//! inserted as a `local` record; an identifier that already exists is a
//! conflict, which is skipped unless force update is on, in which case the
//! stored record is overwritten (keeping its insert date and provenance).

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::extract::{ExtractContext, RecordExtractor};
use crate::model::{MetadataSource, Record};
use crate::storage::repository::{CatalogRepository, StoreError};
use crate::sync::decode::{decode, DecodeError};
use crate::sync::scan::scan;
use crate::sync::types::{LoadReport, Outcome, RecordOutcome, SyncResult};

/// Current UTC time in the catalog's timestamp format.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Synchronization engine.
pub struct Loader<'a, R, E> {
    repo: &'a mut R,
    extractor: &'a E,
    force_update: bool,
}

impl<'a, R: CatalogRepository, E: RecordExtractor> Loader<'a, R, E> {
    pub fn new(repo: &'a mut R, extractor: &'a E) -> Self {
        Self {
            repo,
            extractor,
            force_update: false,
        }
    }

    /// Overwrite records whose identifier is already stored.
    #[must_use]
    pub const fn force_update(mut self, force: bool) -> Self {
        self.force_update = force;
        self
    }

    /// Scan `path` and load everything found.
    ///
    /// # Errors
    ///
    /// Returns an error only if the path cannot be scanned. Per-file and
    /// per-record failures are reported in the [`LoadReport`].
    pub fn load_path(&mut self, path: &Path, recursive: bool) -> SyncResult<LoadReport> {
        let files = scan(path, recursive)?;
        Ok(self.synchronize(&files))
    }

    /// Load the given files, in order.
    pub fn synchronize(&mut self, files: &[PathBuf]) -> LoadReport {
        let mut report = LoadReport {
            total_files: files.len(),
            ..LoadReport::default()
        };

        for (n, path) in files.iter().enumerate() {
            info!("Processing file {} ({} of {})", path.display(), n + 1, files.len());
            if self.load_file(path, &mut report) {
                report.processed.insert(path.clone());
            }
        }

        info!(
            inserted = report.inserted(),
            updated = report.updated(),
            conflicts = report.conflicts(),
            failures = report.failures(),
            "Loaded {} of {} files",
            report.processed.len(),
            report.total_files
        );
        report
    }

    /// Returns true when every record extracted from `path` was stored.
    fn load_file(&mut self, path: &Path, report: &mut LoadReport) -> bool {
        let document = match decode(path).into_document() {
            Ok(document) => document,
            Err(err) => {
                match &err {
                    DecodeError::Malformed(detail) => {
                        error!(file = %path.display(), "Document is not well-formed: {detail}");
                    }
                    DecodeError::Failure(detail) => {
                        error!(file = %path.display(), "Could not decode document: {detail}");
                    }
                }
                report.outcomes.push(file_outcome(path, Outcome::SkippedDecodeError, err.to_string()));
                return false;
            }
        };

        let context = ExtractContext { path };
        let records = match self.extractor.extract(&document, &context) {
            Ok(records) if records.is_empty() => {
                warn!(file = %path.display(), "Document contains no records");
                report.outcomes.push(file_outcome(
                    path,
                    Outcome::SkippedExtractError,
                    "document contains no records".to_string(),
                ));
                return false;
            }
            Ok(records) => records,
            Err(err) => {
                error!(file = %path.display(), "Could not extract records: {err}");
                report.outcomes.push(file_outcome(path, Outcome::SkippedExtractError, err.to_string()));
                return false;
            }
        };

        let mut all_stored = true;
        for record in &records {
            info!(
                identifier = %record.identifier,
                typename = %record.typename,
                "Inserting record"
            );
            let (outcome, message) = self.reconcile(record);
            match outcome {
                Outcome::Inserted => info!(file = %path.display(), "Inserted {}", record.identifier),
                Outcome::Updated => info!(file = %path.display(), "Updated {}", record.identifier),
                Outcome::SkippedConflict => warn!(
                    file = %path.display(),
                    "Record {} already exists, skipping",
                    record.identifier
                ),
                _ => {}
            }
            all_stored &= outcome.is_success();
            report.outcomes.push(RecordOutcome {
                path: path.to_path_buf(),
                identifier: Some(record.identifier.clone()),
                outcome,
                message,
            });
        }
        all_stored
    }

    fn reconcile(&mut self, record: &Record) -> (Outcome, Option<String>) {
        match self.repo.insert(record, &MetadataSource::Local, &timestamp_now()) {
            Ok(()) => (Outcome::Inserted, None),
            Err(StoreError::Conflict { .. }) if self.force_update => {
                debug!(identifier = %record.identifier, "Record exists, updating");
                match self.repo.update(record) {
                    Ok(()) => (Outcome::Updated, None),
                    Err(err) => storage_failure(record, &err),
                }
            }
            Err(err @ StoreError::Conflict { .. }) => (Outcome::SkippedConflict, Some(err.to_string())),
            Err(err) => storage_failure(record, &err),
        }
    }
}

fn storage_failure(record: &Record, err: &StoreError) -> (Outcome, Option<String>) {
    match err {
        StoreError::Storage { message, source } => {
            error!(identifier = %record.identifier, "Record not stored: {message}");
            debug!(identifier = %record.identifier, "Storage error detail: {source:?}");
        }
        other => error!(identifier = %record.identifier, "Record not stored: {other}"),
    }
    (Outcome::FailedStorage, Some(err.to_string()))
}

fn file_outcome(path: &Path, outcome: Outcome, message: String) -> RecordOutcome {
    RecordOutcome {
        path: path.to_path_buf(),
        identifier: None,
        outcome,
        message: Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DialectExtractor;
    use crate::storage::repository::{Constraint, StoreResult};
    use crate::storage::sqlite::SqliteCatalog;
    use std::fs;
    use tempfile::TempDir;

    fn csw(id: &str, title: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<csw:Record xmlns:csw="http://www.opengis.net/cat/csw/2.0.2" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:identifier>{id}</dc:identifier>
  <dc:title>{title}</dc:title>
</csw:Record>"#
        )
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }

    #[test]
    fn test_load_is_idempotent() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.xml", &csw("rec-a", "A"));
        write(temp.path(), "b.xml", &csw("rec-b", "B"));
        let mut catalog = SqliteCatalog::open_memory().unwrap();
        let extractor = DialectExtractor;

        let first = Loader::new(&mut catalog, &extractor)
            .load_path(temp.path(), false)
            .unwrap();
        assert_eq!(first.inserted(), 2);
        assert_eq!(first.processed.len(), 2);

        let second = Loader::new(&mut catalog, &extractor)
            .load_path(temp.path(), false)
            .unwrap();
        assert_eq!(second.inserted(), 0);
        assert_eq!(second.conflicts(), 2);
        assert_eq!(second.failures(), 0);
        assert!(second.processed.is_empty());
        assert_eq!(catalog.count(&Constraint::All).unwrap(), 2);
    }

    #[test]
    fn test_force_update_keeps_insert_date() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "a.xml", &csw("rec-a", "Original"));
        let mut catalog = SqliteCatalog::open_memory().unwrap();
        let extractor = DialectExtractor;

        Loader::new(&mut catalog, &extractor).synchronize(&[file.clone()]);
        let before = catalog.get("rec-a").unwrap().unwrap();

        // Pin a distinguishable insert date so the check does not depend on the clock.
        catalog
            .conn()
            .execute("UPDATE records SET insert_date = '2000-01-01T00:00:00Z'", [])
            .unwrap();

        fs::write(&file, csw("rec-a", "Revised")).unwrap();
        let report = Loader::new(&mut catalog, &extractor)
            .force_update(true)
            .synchronize(&[file.clone()]);
        assert_eq!(report.updated(), 1);
        assert!(report.processed.contains(&file));

        let after = catalog.get("rec-a").unwrap().unwrap();
        assert_eq!(after.properties.title.as_deref(), Some("Revised"));
        assert_eq!(after.insert_date, "2000-01-01T00:00:00Z");
        assert_ne!(after.raw_document, before.raw_document);
    }

    #[test]
    fn test_one_malformed_file_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "1.xml", &csw("one", "1"));
        let broken = write(temp.path(), "2.xml", "<csw:Record><unclosed></csw:Record>");
        write(temp.path(), "3.xml", &csw("three", "3"));
        let mut catalog = SqliteCatalog::open_memory().unwrap();

        let report = Loader::new(&mut catalog, &DialectExtractor)
            .load_path(temp.path(), false)
            .unwrap();
        assert_eq!(report.total_files, 3);
        assert_eq!(report.processed.len(), 2);
        assert!(!report.processed.contains(&broken));
        assert_eq!(report.count(Outcome::SkippedDecodeError), 1);
        assert_eq!(catalog.count(&Constraint::All).unwrap(), 2);
    }

    #[test]
    fn test_unsupported_document_is_extract_skip() {
        let temp = TempDir::new().unwrap();
        let file = write(temp.path(), "x.xml", "<unknown/>");
        let mut catalog = SqliteCatalog::open_memory().unwrap();

        let report = Loader::new(&mut catalog, &DialectExtractor).synchronize(&[file]);
        assert_eq!(report.count(Outcome::SkippedExtractError), 1);
        assert!(report.processed.is_empty());
    }

    #[test]
    fn test_json_feature_collection() {
        let temp = TempDir::new().unwrap();
        let file = write(
            temp.path(),
            "fc.json",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"f1","properties":{"title":"one"}},
                {"type":"Feature","id":"f2","properties":{"title":"two"}}]}"#,
        );
        let mut catalog = SqliteCatalog::open_memory().unwrap();

        let report = Loader::new(&mut catalog, &DialectExtractor).synchronize(&[file.clone()]);
        assert_eq!(report.inserted(), 2);
        assert!(report.processed.contains(&file));
        assert!(catalog.get("f2").unwrap().unwrap().is_json());
    }

    /// Delegates to SQLite but rejects one identifier with a storage error.
    struct RejectingRepo {
        inner: SqliteCatalog,
        reject: &'static str,
    }

    impl CatalogRepository for RejectingRepo {
        fn insert(&mut self, record: &Record, source: &MetadataSource, ts: &str) -> StoreResult<()> {
            if record.identifier == self.reject {
                return Err(StoreError::from(rusqlite::Error::InvalidQuery));
            }
            self.inner.insert(record, source, ts)
        }

        fn update(&mut self, record: &Record) -> StoreResult<()> {
            self.inner.update(record)
        }

        fn delete(&mut self, constraint: &Constraint) -> StoreResult<usize> {
            self.inner.delete(constraint)
        }

        fn query(
            &self,
            constraint: &Constraint,
            max_records: Option<usize>,
        ) -> StoreResult<(usize, Vec<Record>)> {
            self.inner.query(constraint, max_records)
        }
    }

    #[test]
    fn test_storage_error_is_not_a_conflict() {
        let temp = TempDir::new().unwrap();
        let good = write(temp.path(), "good.xml", &csw("good", "g"));
        let bad = write(temp.path(), "bad.xml", &csw("bad", "b"));
        let mut repo = RejectingRepo {
            inner: SqliteCatalog::open_memory().unwrap(),
            reject: "bad",
        };

        // Force update must not turn a storage error into an update attempt.
        let report = Loader::new(&mut repo, &DialectExtractor)
            .force_update(true)
            .synchronize(&[bad.clone(), good.clone()]);
        assert_eq!(report.count(Outcome::FailedStorage), 1);
        assert_eq!(report.updated(), 0);
        assert!(report.processed.contains(&good));
        assert!(!report.processed.contains(&bad));
    }
}
