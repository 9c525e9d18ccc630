//! `load-records`: load documents from a file or directory.

use std::path::Path;

use colored::Colorize;

use super::CommandContext;
use crate::error::Result;
use crate::extract::DialectExtractor;
use crate::sync::{Loader, Outcome};

/// Load every document under `path`.
///
/// # Errors
///
/// Returns an error if the catalog cannot be opened or `path` does not exist.
/// Per-file failures are reported, not returned.
pub fn execute(ctx: &CommandContext, path: &Path, recursive: bool, force_update: bool) -> Result<()> {
    let mut catalog = ctx.open_catalog()?;
    let extractor = DialectExtractor;

    let report = Loader::new(&mut catalog, &extractor)
        .force_update(force_update)
        .load_path(path, recursive)?;

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": true,
            "table": ctx.table,
            "total_files": report.total_files,
            "processed": report.processed,
            "inserted": report.inserted(),
            "updated": report.updated(),
            "conflicts": report.conflicts(),
            "failures": report.failures(),
            "outcomes": report.outcomes,
        }));
    }

    for outcome in &report.outcomes {
        let padded = format!("{:<22}", outcome.outcome.as_str());
        let label = match outcome.outcome {
            Outcome::Inserted | Outcome::Updated => padded.green(),
            Outcome::SkippedConflict => padded.yellow(),
            _ => padded.red(),
        };
        let id = outcome.identifier.as_deref().unwrap_or("-");
        ctx.say(format!("  {label} {id}  {}", outcome.path.display()));
    }

    ctx.say(format!(
        "Loaded {} of {} files ({} inserted, {} updated, {} skipped, {} failed)",
        report.processed.len().to_string().bold(),
        report.total_files,
        report.inserted(),
        report.updated(),
        report.conflicts(),
        report.failures()
    ));
    if report.conflicts() > 0 && !force_update {
        ctx.say("Use --yes to overwrite existing records.");
    }
    Ok(())
}
