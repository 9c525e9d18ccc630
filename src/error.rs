//! Error types for catadm.
//!
//! Each [`Error`] carries a stable [`ErrorCode`], an optional recovery hint,
//! and a JSON form printed to stderr under `--json`. Every failing command
//! exits with status 1; the code string, not the exit status, distinguishes
//! error kinds.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::repository::StoreError;
use crate::sync::SyncError;

/// Result type alias for catadm operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit status for any failed command.
pub const FAILURE_EXIT_CODE: u8 = 1;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    AlreadyProvisioned,
    DatabaseError,
    StorageError,
    PathNotFound,
    InvalidArgument,
    ConfigError,
    SyncError,
    HttpError,
    XmlError,
    IoError,
    JsonError,
    InternalError,
}

impl ErrorCode {
    /// Stable code string used in `--json` error output.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyProvisioned => "ALREADY_PROVISIONED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::StorageError => "STORAGE_ERROR",
            Self::PathNotFound => "PATH_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::SyncError => "SYNC_ERROR",
            Self::HttpError => "HTTP_ERROR",
            Self::XmlError => "XML_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in catadm operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog not initialized: run `catadm setup-db` first")]
    NotInitialized,

    #[error("Database tables already exist: table '{table}'")]
    AlreadyProvisioned { table: String },

    #[error("Path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyProvisioned { .. } => ErrorCode::AlreadyProvisioned,
            Self::PathNotFound { .. } => ErrorCode::PathNotFound,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Storage(_) => ErrorCode::StorageError,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Http(_) => ErrorCode::HttpError,
            Self::Xml(_) => ErrorCode::XmlError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        FAILURE_EXIT_CODE
    }

    /// What the operator can do about it, when there is something to do.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some(
                "Provision the catalog with `catadm setup-db`, or point --db / CATADM_DB at an existing one"
                    .to_string(),
            ),
            Self::AlreadyProvisioned { table } => Some(format!(
                "Table '{table}' is already provisioned. Use `catadm delete-records` to empty it."
            )),
            Self::PathNotFound { path } => Some(format!(
                "Check that {} exists and is readable.",
                path.display()
            )),
            Self::Config(_) => Some(
                "Config is read from --config, CATADM_CONFIG, or ~/.catadm/config.json".to_string(),
            ),
            Self::Database(_)
            | Self::Storage(_)
            | Self::Sync(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Http(_)
            | Self::Xml(_)
            | Self::InvalidArgument(_)
            | Self::Other(_) => None,
        }
    }

    /// The `{"error": {...}}` object printed under `--json`.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": self.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
