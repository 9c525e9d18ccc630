//! Reports and errors shared by the load, export, and harvest engines.
//!
//! Engines never abort a batch because of one bad file or record. Instead
//! they record an outcome per item and hand the full report back to the
//! caller, which decides how to present it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::storage::repository::StoreError;

/// What happened to one record (or one file, when nothing was extracted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// New record stored.
    Inserted,
    /// Existing record overwritten (force update).
    Updated,
    /// File could not be read or parsed.
    SkippedDecodeError,
    /// File parsed but no records could be extracted.
    SkippedExtractError,
    /// Identifier already stored and force update was off.
    SkippedConflict,
    /// The store rejected the record for a reason other than a conflict.
    FailedStorage,
}

impl Outcome {
    /// Whether this outcome counts toward a file being processed.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::SkippedDecodeError => "skipped-decode-error",
            Self::SkippedExtractError => "skipped-extract-error",
            Self::SkippedConflict => "skipped-conflict",
            Self::FailedStorage => "failed-storage",
        }
    }
}

/// One entry of a load report.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub path: PathBuf,
    /// `None` for file-level failures (decode / extract).
    pub identifier: Option<String>,
    pub outcome: Outcome,
    /// Diagnostic for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a load run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LoadReport {
    /// Number of files scanned.
    pub total_files: usize,
    /// Every outcome, in processing order.
    pub outcomes: Vec<RecordOutcome>,
    /// Files whose records were all inserted or updated.
    pub processed: BTreeSet<PathBuf>,
}

impl LoadReport {
    /// Number of outcomes of the given kind.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }

    #[must_use]
    pub fn inserted(&self) -> usize {
        self.count(Outcome::Inserted)
    }

    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(Outcome::Updated)
    }

    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.count(Outcome::SkippedConflict)
    }

    /// Outcomes that are neither successes nor conflicts.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.outcome.is_success() && o.outcome != Outcome::SkippedConflict)
            .count()
    }
}

/// A record that could not be exported.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFailure {
    pub identifier: String,
    pub path: PathBuf,
    pub message: String,
}

/// Two records whose identifiers sanitize to the same file name. The later
/// record's file replaced the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportCollision {
    pub path: PathBuf,
    pub replaced: String,
    pub by: String,
}

/// Result of an export run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportReport {
    /// Records found in the store.
    pub total: usize,
    /// Files fully written.
    pub written: BTreeSet<PathBuf>,
    pub failed: Vec<ExportFailure>,
    pub collisions: Vec<ExportCollision>,
}

/// A harvested record whose refresh failed.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestFailure {
    pub identifier: String,
    pub source: String,
    pub message: String,
}

/// Result of a harvest refresh.
#[derive(Debug, Default, Clone, Serialize)]
pub struct HarvestReport {
    /// Non-local records found in the store.
    pub total: usize,
    /// Identifiers successfully re-requested.
    pub refreshed: Vec<String>,
    pub failed: Vec<HarvestFailure>,
}

impl HarvestReport {
    /// True when there was nothing to refresh.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.total == 0
    }
}

/// Setup-level sync errors. Per-item failures end up in reports instead.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Scan or output path does not exist.
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// Filesystem error on a specific path.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Repository failure outside per-record reconciliation.
    #[error("Repository error: {0}")]
    Store(#[from] StoreError),

    /// XML serialization failure.
    #[error("XML write error: {0}")]
    XmlWrite(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(path: &str, outcome: Outcome) -> RecordOutcome {
        RecordOutcome {
            path: PathBuf::from(path),
            identifier: None,
            outcome,
            message: None,
        }
    }

    #[test]
    fn test_load_report_counts() {
        let report = LoadReport {
            total_files: 3,
            outcomes: vec![
                outcome("a.xml", Outcome::Inserted),
                outcome("b.xml", Outcome::SkippedConflict),
                outcome("c.xml", Outcome::SkippedDecodeError),
                outcome("c.xml", Outcome::Updated),
            ],
            processed: BTreeSet::new(),
        };
        assert_eq!(report.inserted(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.conflicts(), 1);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn test_outcome_serializes_kebab_case() {
        let json = serde_json::to_string(&Outcome::SkippedConflict).unwrap();
        assert_eq!(json, "\"skipped-conflict\"");
        assert_eq!(Outcome::FailedStorage.as_str(), "failed-storage");
    }

    #[test]
    fn test_harvest_noop() {
        assert!(HarvestReport::default().is_noop());
    }
}
