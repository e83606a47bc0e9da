//! User settings for cliq.
//!
//! ## config.kdl
//!
//! Located at `$CLIQ_CONFIG_DIR/config.kdl`, or `~/.config/cliq/config.kdl`
//! on Linux.
//!
//! Contains:
//! - `nvim-path` / `tmux-path` - Explicit config locations
//! - `auto-detect` - Probe the usual locations when a path is unset
//! - `cache-enabled` / `cache-ttl-hours` / `cache-dir` - Snapshot cache policy
//! - `log-level` - Default diagnostic verbosity
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > auto-detection > defaults. See [`resolver`].

pub mod paths;
pub mod resolver;
pub mod schema;

pub use paths::{CACHE_DIR_ENV, CONFIG_DIR_ENV, config_dir, config_file_path, expand_home};
pub use resolver::{ConfigOverrides, Resolved, ResolvedSettings, ValueSource, resolve_settings};
pub use schema::{CONFIG_KEYS, CliqConfig, LogLevel};

use crate::{Error, Result};
use kdl::KdlDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Load config.kdl from the default location.
///
/// Returns an empty config if the file doesn't exist.
pub fn load_config() -> Result<CliqConfig> {
    load_config_from(&config_file_path()?)
}

/// Load and validate a config.kdl file.
///
/// Returns an empty config if the file doesn't exist. Parse and validation
/// failures are [`Error::Config`].
pub fn load_config_from(path: &Path) -> Result<CliqConfig> {
    let config = read_config_from(path)?;
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(config)
}

/// Read config.kdl from the default location without validating values.
pub fn read_config() -> Result<CliqConfig> {
    read_config_from(&config_file_path()?)
}

/// Parse a config.kdl file without validating values.
///
/// Used when editing, so an invalid value can be replaced.
pub fn read_config_from(path: &Path) -> Result<CliqConfig> {
    if !path.exists() {
        return Ok(CliqConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| {
            Error::Config(format!(
                "Failed to parse KDL in {}: {}",
                path.display(),
                e
            ))
        })?;

    Ok(CliqConfig::from_kdl(&doc))
}

/// Write config.kdl to the default location, creating the directory.
pub fn save_config(config: &CliqConfig) -> Result<PathBuf> {
    let path = config_file_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Write a config.kdl file, creating its parent directory.
pub fn save_config_to(config: &CliqConfig, path: &Path) -> Result<()> {
    config.validate().map_err(Error::Config)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, config.to_kdl().to_string())?;
    Ok(())
}
