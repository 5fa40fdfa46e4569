//! Reset command handler

use anyhow::Result;

use zotrem_core::Command;

use super::LocalPlugin;
use crate::output::Output;

/// Forget the mirror maps; nodes are kept
pub async fn reset(plugin: &mut LocalPlugin, output: &Output) -> Result<()> {
    plugin.run(Command::Reset).await?;
    super::finish(plugin, output)?;
    output.success("Mirror maps cleared. The next sync treats everything as new.");
    Ok(())
}
