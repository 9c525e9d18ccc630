//! Repository interface consumed by the sync engines.
//!
//! The engines only see this trait, so they can run against SQLite in
//! production and against any other implementation in tests. Identifier
//! uniqueness is the repository's job: a duplicate insert must come back as
//! [`StoreError::Conflict`], never as a generic storage failure.

use crate::model::{MetadataSource, Record};

/// Record selection predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Every record.
    All,
    /// The record with this identifier.
    Identifier(String),
    /// Records whose `mdsource` is `local`.
    Local,
    /// Records whose `mdsource` is not `local`.
    Harvested,
}

/// Repository operation failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert rejected because the identifier already exists.
    #[error("record already exists: {identifier}")]
    Conflict { identifier: String },

    /// Update target does not exist.
    #[error("record not found: {identifier}")]
    NotFound { identifier: String },

    /// Any other rejection by the storage engine.
    #[error("storage error: {message}")]
    Storage {
        /// The engine's own message, without the statement text.
        message: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// Whether this is a duplicate-identifier conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        let message = match &err {
            rusqlite::Error::SqliteFailure(code, Some(msg)) => format!("{msg} ({:?})", code.code),
            rusqlite::Error::SqliteFailure(code, None) => code.to_string(),
            other => other.to_string(),
        };
        Self::Storage {
            message,
            source: err,
        }
    }
}

/// Result type for repository operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence boundary for catalog records.
pub trait CatalogRepository {
    /// Insert a new record with the given provenance and insert timestamp.
    ///
    /// # Errors
    ///
    /// `Conflict` if the identifier exists, `Storage` otherwise.
    fn insert(
        &mut self,
        record: &Record,
        source: &MetadataSource,
        timestamp: &str,
    ) -> StoreResult<()>;

    /// Replace the mutable fields of an existing record.
    ///
    /// The stored `insert_date` and `mdsource` are preserved.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has the identifier, `Storage` otherwise.
    fn update(&mut self, record: &Record) -> StoreResult<()>;

    /// Delete matching records, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    fn delete(&mut self, constraint: &Constraint) -> StoreResult<usize>;

    /// Return the total match count and up to `max_records` records,
    /// ordered by identifier. `None` means unbounded.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn query(
        &self,
        constraint: &Constraint,
        max_records: Option<usize>,
    ) -> StoreResult<(usize, Vec<Record>)>;

    /// Count matching records.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    fn count(&self, constraint: &Constraint) -> StoreResult<usize> {
        self.query(constraint, Some(0)).map(|(count, _)| count)
    }
}
