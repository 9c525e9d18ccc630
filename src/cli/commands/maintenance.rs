//! `rebuild-db-indexes` and `optimize-db`.

use super::CommandContext;
use crate::error::Result;

/// Rebuild the records table indexes.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or `REINDEX` fails.
pub fn rebuild_indexes(ctx: &CommandContext) -> Result<()> {
    let catalog = ctx.open_catalog()?;
    tracing::info!("Rebuilding indexes on table {}", ctx.table);
    catalog.reindex()?;
    report(ctx, "rebuild-db-indexes", &format!("Rebuilt indexes on '{}'", ctx.table))
}

/// Vacuum and analyze the database.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or optimization fails.
pub fn optimize(ctx: &CommandContext) -> Result<()> {
    let catalog = ctx.open_catalog()?;
    tracing::info!("Optimizing database {}", ctx.db_path.display());
    catalog.optimize()?;
    report(ctx, "optimize-db", &format!("Optimized {}", ctx.db_path.display()))
}

fn report(ctx: &CommandContext, operation: &str, message: &str) -> Result<()> {
    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": true,
            "operation": operation,
            "table": ctx.table,
        }));
    }
    ctx.say(message);
    Ok(())
}
