//! SQLite storage implementation.
//!
//! [`SqliteCatalog`] implements [`CatalogRepository`] over a single wide
//! records table. Every mutation is one statement, so an interrupted run
//! never leaves a half-written record behind.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, ToSql};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{MetadataSource, Record, RecordProperties};
use crate::storage::repository::{CatalogRepository, Constraint, StoreError, StoreResult};
use crate::storage::schema::{provision, table_exists, validate_table_name, RECORD_COLUMNS};

/// SQLite-backed catalog.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
    table: String,
}

impl SqliteCatalog {
    /// Open a provisioned catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the file or the records table is missing,
    /// or an error if the connection cannot be established.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        if !path.exists() {
            return Err(Error::NotInitialized);
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        if !table_exists(&conn, table)? {
            return Err(Error::NotInitialized);
        }

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Create the database file and provision the records table.
    ///
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing, the table already
    /// exists, or provisioning fails.
    pub fn create(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::Config(format!(
                    "SQLite directory {} does not exist",
                    parent.display()
                )));
            }
        }

        let mut conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        provision(&mut conn, table)?;

        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Open a provisioned in-memory catalog (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        provision(&mut conn, crate::storage::schema::DEFAULT_TABLE)?;
        Ok(Self {
            conn,
            table: crate::storage::schema::DEFAULT_TABLE.to_string(),
        })
    }

    /// Table this catalog reads and writes.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Fetch one record by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, identifier: &str) -> StoreResult<Option<Record>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE identifier = ?1",
            self.table
        );
        Ok(self
            .conn
            .query_row(&sql, [identifier], map_record_row)
            .optional()?)
    }

    /// Rebuild the table's indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if `REINDEX` fails.
    pub fn reindex(&self) -> Result<()> {
        self.conn.execute_batch(&format!("REINDEX {}", self.table))?;
        Ok(())
    }

    /// Reclaim space and refresh planner statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if `VACUUM` or `ANALYZE` fails.
    pub fn optimize(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        self.conn.execute_batch("ANALYZE")?;
        Ok(())
    }
}

/// SQL `WHERE` clause and bound parameters for a constraint.
fn where_clause(constraint: &Constraint) -> (&'static str, Vec<&dyn ToSql>) {
    match constraint {
        Constraint::All => ("1 = 1", Vec::new()),
        Constraint::Identifier(id) => ("identifier = ?1", vec![id as &dyn ToSql]),
        Constraint::Local => ("mdsource = 'local'", Vec::new()),
        Constraint::Harvested => ("mdsource != 'local'", Vec::new()),
    }
}

impl CatalogRepository for SqliteCatalog {
    fn insert(
        &mut self,
        record: &Record,
        source: &MetadataSource,
        timestamp: &str,
    ) -> StoreResult<()> {
        // ON CONFLICT DO NOTHING turns a duplicate key into zero affected rows,
        // which is the only signal used for conflicts.
        let sql = format!(
            "INSERT INTO {} ({RECORD_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
             ON CONFLICT(identifier) DO NOTHING",
            self.table
        );
        let p = &record.properties;
        let changed = self.conn.execute(
            &sql,
            rusqlite::params![
                record.identifier,
                record.typename,
                record.schema,
                source.as_str(),
                timestamp,
                record.raw_document,
                record.content_type,
                p.anytext,
                p.language,
                p.title,
                p.abstract_text,
                p.keywords,
                p.date,
                p.date_modified,
                p.resource_type,
                p.format,
                p.creator,
                p.publisher,
                p.contributor,
                p.organization,
                p.rights,
                p.topic_category,
                p.wkt_geometry,
                p.links,
                p.contacts,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::Conflict {
                identifier: record.identifier.clone(),
            });
        }

        debug!(identifier = %record.identifier, "Inserted record");
        Ok(())
    }

    fn update(&mut self, record: &Record) -> StoreResult<()> {
        let sql = format!(
            "UPDATE {} SET
               typename = ?2, schema = ?3, xml = ?4, metadata_type = ?5, anytext = ?6,
               language = ?7, title = ?8, abstract = ?9, keywords = ?10, date = ?11,
               date_modified = ?12, type = ?13, format = ?14, creator = ?15,
               publisher = ?16, contributor = ?17, organization = ?18, rights = ?19,
               topic_category = ?20, wkt_geometry = ?21, links = ?22, contacts = ?23
             WHERE identifier = ?1",
            self.table
        );
        let p = &record.properties;
        let changed = self.conn.execute(
            &sql,
            rusqlite::params![
                record.identifier,
                record.typename,
                record.schema,
                record.raw_document,
                record.content_type,
                p.anytext,
                p.language,
                p.title,
                p.abstract_text,
                p.keywords,
                p.date,
                p.date_modified,
                p.resource_type,
                p.format,
                p.creator,
                p.publisher,
                p.contributor,
                p.organization,
                p.rights,
                p.topic_category,
                p.wkt_geometry,
                p.links,
                p.contacts,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound {
                identifier: record.identifier.clone(),
            });
        }

        debug!(identifier = %record.identifier, "Updated record");
        Ok(())
    }

    fn delete(&mut self, constraint: &Constraint) -> StoreResult<usize> {
        let (clause, params) = where_clause(constraint);
        let sql = format!("DELETE FROM {} WHERE {clause}", self.table);
        Ok(self.conn.execute(&sql, params.as_slice())?)
    }

    fn query(
        &self,
        constraint: &Constraint,
        max_records: Option<usize>,
    ) -> StoreResult<(usize, Vec<Record>)> {
        let (clause, params) = where_clause(constraint);

        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {clause}", self.table);
        let count: i64 = self
            .conn
            .query_row(&count_sql, params.as_slice(), |row| row.get(0))?;

        // SQLite treats a negative LIMIT as unbounded.
        let limit = max_records.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE {clause} ORDER BY identifier LIMIT {limit}",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params.as_slice(), map_record_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((usize::try_from(count).unwrap_or(0), records))
    }
}

// Helper to map record rows, column order follows RECORD_COLUMNS
fn map_record_row(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    let mdsource: String = row.get(3)?;
    Ok(Record {
        identifier: row.get(0)?,
        typename: row.get(1)?,
        schema: row.get(2)?,
        mdsource: MetadataSource::from(mdsource),
        insert_date: row.get(4)?,
        raw_document: row.get(5)?,
        content_type: row.get(6)?,
        properties: RecordProperties {
            anytext: row.get(7)?,
            language: row.get(8)?,
            title: row.get(9)?,
            abstract_text: row.get(10)?,
            keywords: row.get(11)?,
            date: row.get(12)?,
            date_modified: row.get(13)?,
            resource_type: row.get(14)?,
            format: row.get(15)?,
            creator: row.get(16)?,
            publisher: row.get(17)?,
            contributor: row.get(18)?,
            organization: row.get(19)?,
            rights: row.get(20)?,
            topic_category: row.get(21)?,
            wkt_geometry: row.get(22)?,
            links: row.get(23)?,
            contacts: row.get(24)?,
        },
    })
}
