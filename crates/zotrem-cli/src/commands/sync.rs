//! Sync command handler

use anyhow::{Context, Result};

use zotrem_core::{Command, CommandOutcome};

use super::LocalPlugin;
use crate::output::Output;

/// Mirror the Zotero library into the workspace
pub async fn sync(plugin: &mut LocalPlugin, output: &Output) -> Result<()> {
    let library = plugin.settings().library_id.clone();
    output.message(&format!("Syncing Zotero library {}...", library));

    let outcome = plugin.run(Command::UpdateCollections).await;
    // Persist whatever was mirrored before a failure
    super::finish(plugin, output)?;

    if let CommandOutcome::Synced(report) = outcome.context("Sync failed")? {
        output.print_report(&report);
        output.success("Sync complete");
    }
    Ok(())
}
