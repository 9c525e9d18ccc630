//! Records table definition and provisioning.
//!
//! The catalog is one wide table keyed by `identifier`. The table name is
//! configurable, so the DDL is a template and every name is validated before
//! it is spliced into SQL.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Current schema version, stamped into `PRAGMA user_version`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Default records table name.
pub const DEFAULT_TABLE: &str = "records";

/// Column list shared by inserts and selects, in `map_record_row` order.
pub const RECORD_COLUMNS: &str = "identifier, typename, schema, mdsource, insert_date, xml, \
     metadata_type, anytext, language, title, abstract, keywords, date, date_modified, type, \
     format, creator, publisher, contributor, organization, rights, topic_category, \
     wkt_geometry, links, contacts";

/// DDL template; `{table}` is replaced with a validated table name.
const RECORDS_DDL: &str = r"
CREATE TABLE {table} (
    -- core; nothing happens without these
    identifier TEXT PRIMARY KEY,
    typename TEXT NOT NULL DEFAULT 'csw:Record',
    schema TEXT NOT NULL DEFAULT 'http://www.opengis.net/cat/csw/2.0.2',
    mdsource TEXT NOT NULL DEFAULT 'local',
    insert_date TEXT NOT NULL,
    xml TEXT NOT NULL,
    metadata_type TEXT NOT NULL DEFAULT 'application/xml',
    anytext TEXT,
    language TEXT,

    -- descriptive payload
    title TEXT,
    abstract TEXT,
    keywords TEXT,
    date TEXT,
    date_modified TEXT,
    type TEXT,
    format TEXT,
    creator TEXT,
    publisher TEXT,
    contributor TEXT,
    organization TEXT,
    rights TEXT,
    topic_category TEXT,
    wkt_geometry TEXT,
    links TEXT,
    contacts TEXT
);

CREATE INDEX ix_{table}_typename ON {table}(typename);
CREATE INDEX ix_{table}_schema ON {table}(schema);
CREATE INDEX ix_{table}_mdsource ON {table}(mdsource);
CREATE INDEX ix_{table}_insert_date ON {table}(insert_date);
CREATE INDEX ix_{table}_title ON {table}(title);
CREATE INDEX ix_{table}_date_modified ON {table}(date_modified);
";

/// Check that `table` is a plain SQL identifier.
///
/// # Errors
///
/// Returns `InvalidArgument` for empty names or names containing anything
/// other than ASCII letters, digits and underscores (or starting with a digit).
pub fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "invalid table name '{table}': use letters, digits and underscores"
        )))
    }
}

/// Render the DDL for a table.
///
/// # Errors
///
/// Returns an error if the table name is invalid.
pub fn records_ddl(table: &str) -> Result<String> {
    validate_table_name(table)?;
    Ok(RECORDS_DDL.replace("{table}", table))
}

/// Whether the records table exists.
///
/// # Errors
///
/// Returns an error if `sqlite_master` cannot be queried.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Create the records table and its indexes.
///
/// Runs in one transaction. Fails with `AlreadyProvisioned` if the table is
/// already there rather than silently reusing it.
///
/// # Errors
///
/// Returns an error if the table exists, the name is invalid, or DDL fails.
pub fn provision(conn: &mut Connection, table: &str) -> Result<()> {
    let ddl = records_ddl(table)?;

    if table_exists(conn, table)? {
        return Err(Error::AlreadyProvisioned {
            table: table.to_string(),
        });
    }

    let tx = conn.transaction()?;
    tx.execute_batch(&ddl)?;
    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    tx.commit()?;

    Ok(())
}

/// Read the stamped schema version.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}
