//! `refresh-harvested-records`: re-harvest every non-local record.

use std::time::Duration;

use colored::Colorize;

use super::CommandContext;
use crate::config::resolve_server_url;
use crate::error::Result;
use crate::sync::{CswHarvestClient, HarvestRefresher};

/// Send a harvest request for every harvested record to the catalog endpoint.
///
/// # Errors
///
/// Returns an error if no endpoint is configured, the catalog cannot be
/// opened, or the query fails. Per-record failures are reported.
pub fn execute(ctx: &CommandContext, url: Option<&str>, timeout: u64) -> Result<()> {
    let endpoint = resolve_server_url(url, &ctx.config)?;
    let catalog = ctx.open_catalog()?;
    let client = CswHarvestClient::new(endpoint.clone(), Duration::from_secs(timeout))?;

    let report = HarvestRefresher::new(&catalog, &client).refresh()?;

    if ctx.json {
        return ctx.emit_json(&serde_json::json!({
            "success": report.failed.is_empty(),
            "endpoint": endpoint,
            "report": report,
        }));
    }

    if report.is_noop() {
        ctx.say("No harvested records");
        return Ok(());
    }
    for failure in &report.failed {
        ctx.say(format!(
            "  {} {} ({}): {}",
            "failed".red(),
            failure.identifier,
            failure.source,
            failure.message
        ));
    }
    ctx.say(format!(
        "Refreshed {} of {} harvested records via {endpoint}",
        report.refreshed.len().to_string().bold(),
        report.total
    ));
    Ok(())
}
