//! Init and Config commands.

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_DIR, CONFIG_FILE, Settings};

/// Run init command - create configuration file.
///
/// Writes to `custom_path` if given, otherwise `.treefind/settings.toml`.
pub fn run_init(custom_path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let config_path = custom_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

    let existed = config_path.exists();
    let path = Settings::init_config_file(&config_path, force)
        .map_err(|e| anyhow::anyhow!("{e} ({})", config_path.display()))?;

    if existed {
        println!("Overwrote configuration at: {}", path.display());
    } else {
        println!("Created configuration file at: {}", path.display());
    }
    println!("Edit this file to customize your settings.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
