//! Tree command handler

use anyhow::Result;

use zotrem_core::Config;

use crate::output::{Output, TreeEntry};

/// Print the workspace outline
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let workspace = super::open_workspace(config)?;
    output.print_tree(&TreeEntry::forest(&workspace));
    Ok(())
}
