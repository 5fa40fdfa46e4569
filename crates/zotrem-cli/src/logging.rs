//! Logging setup
//!
//! Logs go to stderr unless `log_file` is configured. `RUST_LOG` wins over
//! the `-v` count when set.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Map the number of `-v` flags to a level
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let lvl = level(verbosity);
        EnvFilter::new(format!("zotrem_core={},zotrem_cli={}", lvl, lvl))
    })
}

/// Initialize the global subscriber (ignored if one is already set)
pub fn init(verbosity: u8, log_file: Option<&Path>) {
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter(verbosity))
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(file)
                    .try_init();
                debug!("Logging to {:?}", path);
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(7), "trace");
    }
}
