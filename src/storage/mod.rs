//! Catalog storage layer.
//!
//! - [`repository`] - the [`CatalogRepository`] trait the sync engines use
//! - [`schema`] - records table DDL and provisioning
//! - [`sqlite`] - the SQLite implementation

pub mod repository;
pub mod schema;
pub mod sqlite;

pub use repository::{CatalogRepository, Constraint, StoreError, StoreResult};
pub use sqlite::SqliteCatalog;
