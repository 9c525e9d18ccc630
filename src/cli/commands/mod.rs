//! Command implementations.
//!
//! Catalog commands take a [`CommandContext`] holding the resolved config,
//! database location, and table name. Commands that never open the catalog
//! (`post-xml`, `validate-xml`, `get-sysprof`) take only an [`Output`], so a
//! broken config file cannot stop them.

pub mod delete;
pub mod export;
pub mod harvest;
pub mod load;
pub mod maintenance;
pub mod post_xml;
pub mod setup_db;
pub mod sitemap;
pub mod sysprof;
pub mod validate;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::Cli;
use crate::config::{load_config, resolve_db_path, resolve_table, CatalogConfig};
use crate::error::{Error, Result};
use crate::storage::SqliteCatalog;

/// Output mode: `--json` and `--quiet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    #[must_use]
    pub const fn output(&self) -> Output {
        Output::new(self.json, self.quiet)
    }

    /// See [`Output::emit_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn emit_json<T: Serialize>(&self, payload: &T) -> Result<()> {
        self.output().emit_json(payload)
    }

    pub fn say(&self, line: impl std::fmt::Display) {
        self.output().say(line);
    }
}

/// Resolved settings for commands that open the catalog.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: CatalogConfig,
    pub db_path: PathBuf,
    pub table: String,
    pub json: bool,
    pub quiet: bool,
}

impl CommandContext {
    /// Resolve config file, database path, and table from CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is invalid or no database location
    /// can be determined.
    pub fn from_cli(cli: &Cli, json: bool) -> Result<Self> {
        let config = load_config(cli.config.as_deref())?;
        let db_path = resolve_db_path(cli.db.as_deref(), &config).ok_or_else(|| {
            Error::Config("Could not determine a database location; pass --db".into())
        })?;
        let table = resolve_table(cli.table.as_deref(), &config);
        Ok(Self {
            config,
            db_path,
            table,
            json,
            quiet: cli.quiet,
        })
    }

    /// Open the provisioned catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the database or table is missing.
    pub fn open_catalog(&self) -> Result<SqliteCatalog> {
        SqliteCatalog::open(&self.db_path, &self.table)
    }

    #[must_use]
    pub const fn output(&self) -> Output {
        Output::new(self.json, self.quiet)
    }

    /// See [`Output::emit_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn emit_json<T: Serialize>(&self, payload: &T) -> Result<()> {
        self.output().emit_json(payload)
    }

    pub fn say(&self, line: impl std::fmt::Display) {
        self.output().say(line);
    }
}

/// Ask a yes/no question on the terminal. Defaults to no.
///
/// # Errors
///
/// Returns `InvalidArgument` when stdin is not a terminal, so scripts must
/// pass `--yes` explicitly.
pub fn confirm(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(Error::InvalidArgument(
            "Confirmation required: pass --yes to run non-interactively".into(),
        ));
    }

    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
