//! Paste command handler

use std::io::Read;

use anyhow::{Context, Result};

use zotrem_core::{Command, CommandOutcome};

use super::LocalPlugin;
use crate::output::Output;

/// Convert a copied Zotero annotation into an inline link
///
/// The clipboard text comes from `--text`, or stdin when omitted.
pub async fn paste(plugin: &mut LocalPlugin, text: Option<String>, output: &Output) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => read_stdin()?,
    };
    plugin.host_mut().set_clipboard(text);

    let outcome = plugin.run(Command::PasteAnnotations).await?;
    super::finish(plugin, output)?;

    if let CommandOutcome::Pasted(Some(annotation)) = outcome {
        output.print_inserted(&annotation.to_markdown());
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read clipboard text from stdin")?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}
