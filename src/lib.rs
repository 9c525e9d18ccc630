//! catadm - administration for a metadata catalog
//!
//! This crate provides the core functionality for the `catadm` CLI tool:
//! loading metadata documents into a SQLite-backed catalog, exporting them
//! back out, refreshing harvested records, and generating sitemaps.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Records and decoded documents
//! - [`extract`] - Metadata dialect extraction (CSW, ISO 19139, OGC API Records)
//! - [`storage`] - Catalog repository trait and SQLite implementation
//! - [`sync`] - Load, export, harvest refresh, and sitemap engines
//! - [`http`] - Blocking HTTP client
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
