//! Config command - inspect settings and manage scan roots

use super::Result;
use crate::cli::ConfigCommands;
use crate::config::FiletagConfig;
use crate::output::Output;
use ::config::ConfigError;
use std::path::{Path, PathBuf};

fn to_toml(config: &FiletagConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")).into())
}

/// Canonical form of a root so the same directory is not added twice
fn normalize_root(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Execute the config command, saving changes to `config_path`
///
/// # Errors
/// Returns an error if the configuration cannot be serialized or saved.
pub fn execute(
    config: &mut FiletagConfig,
    config_path: &Path,
    command: &ConfigCommands,
    out: Output,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            if out.json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                out.info(format!("# {}", config_path.display()));
                print!("{}", to_toml(config)?);
            }
        }
        ConfigCommands::AddRoot { path } => {
            let root = normalize_root(path);
            if config.add_root(root.clone()) {
                config.save_to(config_path)?;
                out.info(format!("Added scan root {}", root.display()));
            } else {
                out.info(format!("{} is already a scan root", root.display()));
            }
        }
        ConfigCommands::RemoveRoot { path } => {
            let removed = config.remove_root(path) || config.remove_root(&normalize_root(path));
            if removed {
                config.save_to(config_path)?;
                out.info(format!("Removed scan root {}", path.display()));
            } else {
                out.info(format!("{} is not a scan root", path.display()));
            }
        }
    }
    Ok(())
}
