// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading the watcher
//! configuration from the storage directory.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Configuration file name inside the storage directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Path of the configuration file for a storage directory.
pub fn config_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join(CONFIG_FILE)
}

/// Load configuration from a TOML file.
///
/// A missing file falls back to defaults; a file that exists but does not
/// parse is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::warn!("No config at {}; using default configuration.", path.display());
        return Ok(Config::default());
    }
    Config::load(path).map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
}

/// Load, apply environment overrides and validate the configuration.
pub fn load_all(storage_dir: &Path) -> Result<Config> {
    let mut config = load_config(&config_path(storage_dir))?;
    config.apply_env_overrides();

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    Ok(config)
}

/// Write the default configuration, refusing to overwrite unless `force`.
pub fn write_default(storage_dir: &Path, force: bool) -> Result<PathBuf> {
    let path = config_path(storage_dir);
    if path.exists() && !force {
        return Err(AppError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    std::fs::create_dir_all(storage_dir)?;
    std::fs::write(&path, Config::default().to_toml()?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&config_path(tmp.path())).unwrap();
        assert_eq!(config.polling.interval_secs, 60);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(config_path(tmp.path()), "[polling\ninterval_secs = ").unwrap();
        assert!(matches!(
            load_config(&config_path(tmp.path())),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn write_default_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = write_default(tmp.path(), false).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.webhook.max_attempts, 3);
        assert_eq!(loaded.display.offsets["Faint"]["pb"], 3);

        assert!(write_default(tmp.path(), false).is_err());
        assert!(write_default(tmp.path(), true).is_ok());
    }

    #[test]
    fn load_all_validates() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            config_path(tmp.path()),
            "[webhook]\nurl = \"https://example.com/hook\"\n[polling]\ninterval_secs = 0\n",
        )
        .unwrap();

        assert!(load_all(tmp.path()).is_err());
    }
}
