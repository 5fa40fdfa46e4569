//! Run command handler

use anyhow::{bail, Result};

use zotrem_core::Command;

use super::LocalPlugin;
use crate::output::Output;

/// Resolve a command by id, name or quick code
pub fn resolve(query: &str) -> Result<Command> {
    match Command::find(query) {
        Some(command) => Ok(command),
        None => {
            let known: Vec<String> = Command::ALL
                .iter()
                .map(|c| {
                    let spec = c.spec();
                    match spec.quick_code {
                        Some(code) => format!("{} ({}, {})", spec.name, spec.id, code),
                        None => format!("{} ({})", spec.name, spec.id),
                    }
                })
                .collect();
            bail!(
                "Unknown command: '{}'\nAvailable commands:\n  {}",
                query,
                known.join("\n  ")
            );
        }
    }
}

/// Run a plugin command the way the host's command palette would
pub async fn run(plugin: &mut LocalPlugin, command: Command, output: &Output) -> Result<()> {
    match command {
        Command::PasteAnnotations => super::paste::paste(plugin, None, output).await,
        Command::Reset => super::reset::reset(plugin, output).await,
        Command::UpdateCollections => super::sync::sync(plugin, output).await,
    }
}
