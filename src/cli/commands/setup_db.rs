//! `setup-db`: provision the records table.

use serde::Serialize;

use super::CommandContext;
use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use crate::storage::SqliteCatalog;

#[derive(Serialize)]
struct SetupOutput<'a> {
    database: &'a std::path::Path,
    table: &'a str,
    schema_version: i32,
}

/// Create the database (if needed) and the records table.
///
/// # Errors
///
/// Returns an error if the database directory is missing, the table already
/// exists, or provisioning fails.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    tracing::info!(
        "Setting up database {}, table {}",
        ctx.db_path.display(),
        ctx.table
    );
    SqliteCatalog::create(&ctx.db_path, &ctx.table)?;

    if ctx.json {
        return ctx.emit_json(&SetupOutput {
            database: &ctx.db_path,
            table: &ctx.table,
            schema_version: CURRENT_SCHEMA_VERSION,
        });
    }

    ctx.say(format!("Created table '{}'", ctx.table));
    ctx.say(format!("  Database: {}", ctx.db_path.display()));
    Ok(())
}
