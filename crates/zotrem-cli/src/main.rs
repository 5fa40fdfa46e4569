//! zotrem CLI
//!
//! Mirrors a Zotero library into a local knowledge-base workspace.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use zotrem_core::Config;

mod commands;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "zotrem")]
#[command(about = "zotrem - Mirror a Zotero library into a knowledge base")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror collections and top-level items into the workspace
    #[command(alias = "update")]
    Sync,
    /// Forget the stored collection and item maps
    Reset,
    /// Turn a copied Zotero annotation into an inline link
    Paste {
        /// Annotation text (read from stdin if omitted)
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Run a plugin command by id, name or quick code (e.g. `pza`)
    Run {
        /// Command id, name or quick code
        command: String,
    },
    /// Print the workspace outline
    Tree,
    /// Show library and mirror status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, root_document_name, api_key, library_type, library_id, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work without a loadable configuration
    if let Commands::Config { command } = &cli.command {
        logging::init(cli.verbose, None);
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    logging::init(cli.verbose, config.log_file.as_deref());

    match cli.command {
        Commands::Sync => {
            let mut plugin = commands::activate(&config, &output).await?;
            commands::sync::sync(&mut plugin, &output).await
        }
        Commands::Reset => {
            let mut plugin = commands::activate(&config, &output).await?;
            commands::reset::reset(&mut plugin, &output).await
        }
        Commands::Paste { text } => {
            let mut plugin = commands::activate(&config, &output).await?;
            commands::paste::paste(&mut plugin, text, &output).await
        }
        Commands::Run { command } => {
            let command = commands::run::resolve(&command)?;
            let mut plugin = commands::activate(&config, &output).await?;
            commands::run::run(&mut plugin, command, &output).await
        }
        Commands::Tree => commands::tree::show(&config, &output),
        Commands::Status => commands::status::show(&config, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
