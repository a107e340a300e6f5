//! Interactive setup wizard for first-time configuration
//!
//! This module handles the interactive prompts for creating an initial
//! configuration when filetag is run for the first time.

use super::{FiletagConfig, default_database_path};
use config::ConfigError;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::PathBuf;

fn input_error(e: &dialoguer::Error) -> ConfigError {
    ConfigError::Message(format!("Failed to read input: {e}"))
}

/// Interactive first-time setup - prompts for the database and scan roots
///
/// Guides the user through creating their configuration:
/// 1. Prompts for the database location (default: system data directory)
/// 2. Prompts for scan roots until an empty answer
/// 3. Asks whether informational output should be suppressed
/// 4. Saves the configuration
///
/// # Errors
///
/// Returns `ConfigError` if user input cannot be read or the configuration
/// cannot be saved.
///
/// # Examples
/// ```ignore
/// use filetag::config::first_time_setup;
///
/// let config = first_time_setup()?;
/// println!("Scanning {} root(s)", config.roots.len());
/// ```
pub fn first_time_setup() -> Result<FiletagConfig, ConfigError> {
    println!("Welcome to filetag! Let's set up your index.\n");
    let theme = ColorfulTheme::default();

    let db_path: String = Input::with_theme(&theme)
        .with_prompt("Database location")
        .default(default_database_path().to_string_lossy().to_string())
        .interact_text()
        .map_err(|e| input_error(&e))?;

    let mut config = FiletagConfig {
        database: PathBuf::from(db_path),
        ..FiletagConfig::default()
    };

    loop {
        let root: String = Input::with_theme(&theme)
            .with_prompt("Directory to scan (leave empty to finish)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| input_error(&e))?;
        let root = root.trim();
        if root.is_empty() {
            break;
        }
        config.add_root(PathBuf::from(root));
    }

    config.quiet = Confirm::with_theme(&theme)
        .with_prompt("Suppress informational output?")
        .default(false)
        .interact()
        .map_err(|e| input_error(&e))?;

    config.save()?;

    println!("\nConfiguration saved successfully!");
    Ok(config)
}
