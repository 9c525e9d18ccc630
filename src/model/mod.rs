//! Data model types for catadm.
//!
//! This module contains the core data structures:
//! - [`Record`] - A normalized catalog entry
//! - [`Document`] - A decoded source document (JSON or XML)

pub mod document;
pub mod record;

pub use document::{Document, XmlElement, XmlParseError};
pub use record::{MetadataSource, Record, RecordProperties};
