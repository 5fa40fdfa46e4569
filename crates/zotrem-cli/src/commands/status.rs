//! Status command handler

use anyhow::Result;

use zotrem_core::{Config, SyncState};

use crate::output::{Output, OutputFormat};

/// Show configuration and mirror state
pub async fn show(config: &Config, output: &Output) -> Result<()> {
    let workspace = super::open_workspace(config)?;
    let state = SyncState::load(&workspace).await?;
    let library = match config.library_type {
        Some(kind) => format!("{} {}", kind, config.library_id),
        None => "(not set)".to_string(),
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "library": library,
                    "api_url": config.api_url,
                    "data_dir": config.data_dir,
                    "nodes": workspace.nodes().len(),
                    "mirrored": {
                        "collections": state.collection_count(),
                        "items": state.item_count()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{} {}", state.collection_count(), state.item_count());
        }
        OutputFormat::Human => {
            println!("zotrem Status");
            println!("=============");
            println!();
            println!("Zotero:");
            println!("  Library: {}", library);
            println!("  API:     {}", config.api_url);
            println!();
            println!("Workspace:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Nodes:    {}", workspace.nodes().len());
            println!();
            println!("Mirrored:");
            println!("  Collections: {}", state.collection_count());
            println!("  Items:       {}", state.item_count());
        }
    }

    Ok(())
}
