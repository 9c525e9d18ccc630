//! `export-records`: write every record to a directory.

use std::path::Path;

use colored::Colorize;

use super::CommandContext;
use crate::error::Result;
use crate::sync::Exporter;

/// Export all records to `path`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or the directory cannot
/// be created. Individual write failures are reported, not returned.
pub fn execute(ctx: &CommandContext, path: &Path) -> Result<()> {
    let catalog = ctx.open_catalog()?;
    let report = Exporter::new(&catalog).export(path)?;

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": report.failed.is_empty(),
            "output_dir": path,
            "report": report,
        }));
    }

    for failure in &report.failed {
        ctx.say(format!(
            "  {} {}: {}",
            "failed".red(),
            failure.identifier,
            failure.message
        ));
    }
    for collision in &report.collisions {
        ctx.say(format!(
            "  {} {}: '{}' replaced by '{}'",
            "overwritten".yellow(),
            collision.path.display(),
            collision.replaced,
            collision.by
        ));
    }
    ctx.say(format!(
        "Exported {} of {} records to {}",
        report.written.len().to_string().bold(),
        report.total,
        path.display()
    ));
    Ok(())
}
