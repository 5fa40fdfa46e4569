//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use zotrem_core::{Config, LibraryType};

use crate::output::{Output, OutputFormat};

/// Valid keys for `config set`
const KEYS: &str =
    "data_dir, api_url, root_document_name, leading_char, api_key, library_type, library_id, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "api_url": config.api_url,
                    "root_document_name": config.root_document_name,
                    "leading_char": config.leading_char,
                    "api_key_set": !config.api_key.is_empty(),
                    "library_type": config.library_type,
                    "library_id": config.library_id,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!("  api_url:            {}", config.api_url);
            println!("  root_document_name: {}", config.root_document_name);
            println!("  leading_char:       {}", config.leading_char);
            println!(
                "  api_key:            {}",
                if config.api_key.is_empty() {
                    "(not set)"
                } else {
                    "(set)"
                }
            );
            println!(
                "  library_type:       {}",
                config
                    .library_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!(
                "  library_id:         {}",
                if config.library_id.is_empty() {
                    "(not set)"
                } else {
                    &config.library_id
                }
            );
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "api_key" { "(hidden)" } else { value.as_str() };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Apply one `key = value` assignment
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => config.data_dir = value.into(),
        "api_url" => config.api_url = value.trim_end_matches('/').to_string(),
        "root_document_name" => {
            if value.is_empty() {
                bail!("root_document_name cannot be empty");
            }
            config.root_document_name = value.to_string();
        }
        "leading_char" => config.leading_char = value.to_string(),
        "api_key" => config.api_key = value.to_string(),
        "library_type" => {
            config.library_type = if value.is_empty() || value == "none" {
                None
            } else {
                Some(
                    value
                        .parse::<LibraryType>()
                        .map_err(|e| anyhow::anyhow!("Invalid value for library_type: {}", e))?,
                )
            };
        }
        "library_id" => {
            if !value.chars().all(|c| c.is_ascii_digit()) {
                bail!("Invalid value for library_id. Use the numeric user or group id.");
            }
            config.library_id = value.to_string();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                KEYS
            );
        }
    }
    Ok(())
}
