//! `delete-records`: remove every record.

use super::{confirm, CommandContext};
use crate::error::Result;
use crate::storage::{CatalogRepository, Constraint};

/// Delete all records after confirmation.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened, confirmation is needed
/// but unavailable, or the delete fails.
pub fn execute(ctx: &CommandContext, yes: bool) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;

    if !yes && !confirm("This will delete all records! Continue?")? {
        ctx.say("Aborted.");
        return Ok(());
    }

    tracing::info!("Deleting all records");
    let deleted = catalog.delete(&Constraint::All)?;

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": true,
            "table": ctx.table,
            "deleted": deleted,
        }));
    }
    ctx.say(format!("Deleted {deleted} records from '{}'", ctx.table));
    Ok(())
}
