//! `gen-sitemap`: write an XML sitemap.

use std::path::Path;

use super::CommandContext;
use crate::config::resolve_server_url;
use crate::error::Result;
use crate::sync::write_sitemap;

/// Write a sitemap of every record to `output`.
///
/// # Errors
///
/// Returns an error if no endpoint URL is configured, the catalog cannot be
/// opened, or the file cannot be written.
pub fn execute(ctx: &CommandContext, output: &Path, url: Option<&str>) -> Result<()> {
    let base_url = resolve_server_url(url, &ctx.config)?;
    let catalog = ctx.open_catalog()?;
    let count = write_sitemap(&catalog, &base_url, output)?;

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": true,
            "output": output,
            "records": count,
        }));
    }
    ctx.say(format!("Wrote sitemap with {count} records to {}", output.display()));
    Ok(())
}
