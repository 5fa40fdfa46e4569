//! Command handlers

pub mod config;
pub mod paste;
pub mod reset;
pub mod run;
pub mod status;
pub mod sync;
pub mod tree;

use anyhow::{bail, Context, Result};

use zotrem_core::{Activation, Config, LocalWorkspace, Plugin, ZoteroClient};

use crate::output::Output;

/// The plugin running against the local workspace
pub type LocalPlugin = Plugin<LocalWorkspace, ZoteroClient>;

/// Open the workspace with settings taken from the configuration
pub fn open_workspace(config: &Config) -> Result<LocalWorkspace> {
    let mut workspace = LocalWorkspace::open(&config.data_dir)
        .with_context(|| format!("Failed to open workspace in {:?}", config.data_dir))?;
    for (id, value) in config.setting_values() {
        workspace.set_setting(id, value);
    }
    Ok(workspace)
}

/// Activate the plugin, failing if the Zotero client can't be built
pub async fn activate(config: &Config, output: &Output) -> Result<LocalPlugin> {
    let workspace = open_workspace(config)?;
    let api_url = config.api_url.clone();

    let activation = Plugin::activate(workspace, |settings| {
        ZoteroClient::from_settings(settings).map(|client| client.with_base_url(api_url))
    })
    .await
    .context("Failed to activate plugin")?;

    match activation {
        Activation::Ready(plugin) => Ok(plugin),
        Activation::Aborted { host, error } => {
            for toast in host.toasts() {
                output.toast(toast);
            }
            bail!(
                "{}\nConfigure the library with:\n  \
                 zotrem config set library_type user\n  \
                 zotrem config set library_id <your user id>\n  \
                 zotrem config set api_key <your api key>",
                error
            );
        }
    }
}

/// Print toasts the plugin showed and write the workspace to disk
pub fn finish(plugin: &LocalPlugin, output: &Output) -> Result<()> {
    for toast in plugin.host().toasts() {
        output.toast(toast);
    }
    plugin.host().flush().context("Failed to save workspace")
}
