mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./clipdock.toml",
        "~/.config/clipdock/config.toml",
        "/etc/clipdock/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.publisher.program.trim().is_empty() {
        anyhow::bail!("Publisher program cannot be empty");
    }

    if config.publisher.default_privacy.trim().is_empty() {
        anyhow::bail!("Publisher default_privacy cannot be empty");
    }

    let media_dir = config.storage.resolved_media_dir();
    if !media_dir.exists() {
        tracing::warn!("Media directory does not exist yet: {:?}", media_dir);
    }

    Ok(())
}
