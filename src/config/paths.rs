//! Filesystem locations: settings, cache, and auto-detected user configs.

use crate::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "CLIQ_CONFIG_DIR";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "CLIQ_CACHE_DIR";

/// Settings file name inside the settings directory.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

const APP_DIR: &str = "cliq";

/// Directory holding config.kdl.
///
/// `$CLIQ_CONFIG_DIR` if set, else `<platform config dir>/cliq`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = env_path(CONFIG_DIR_ENV) {
        return Ok(dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Full path of config.kdl.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Platform cache directory for cliq, ignoring overrides.
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))
}

/// Non-empty path from an environment variable.
pub fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
///
/// Paths without `~`, or when the home directory is unknown, are returned
/// unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Candidate Neovim config directories, most preferred first.
pub fn nvim_candidates(
    home: Option<&Path>,
    xdg_config_home: Option<&Path>,
    appname: Option<&str>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(app) = appname.filter(|a| !a.is_empty()) {
        match (xdg_config_home, home) {
            (Some(xdg), _) => paths.push(xdg.join(app)),
            (None, Some(home)) => paths.push(home.join(".config").join(app)),
            (None, None) => {}
        }
    }
    if let Some(xdg) = xdg_config_home {
        paths.push(xdg.join("nvim"));
    }
    if let Some(home) = home {
        paths.push(home.join(".config").join("nvim"));
        paths.push(home.join(".nvim"));
    }

    paths.dedup();
    paths
}

/// Candidate tmux config files, most preferred first.
pub fn tmux_candidates(home: Option<&Path>, xdg_config_home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(xdg) = xdg_config_home {
        paths.push(xdg.join("tmux").join("tmux.conf"));
    }
    if let Some(home) = home {
        paths.push(home.join(".config").join("tmux").join("tmux.conf"));
        paths.push(home.join(".tmux.conf"));
    }
    paths.dedup();
    paths
}

/// First candidate directory holding `init.lua` or `init.vim`.
pub fn find_nvim_config(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join("init.lua").is_file() || dir.join("init.vim").is_file())
        .cloned()
}

/// First candidate file that exists.
pub fn find_tmux_config(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Locate the user's Neovim config directory from the environment.
///
/// Honors `$NVIM_APPNAME` and `$XDG_CONFIG_HOME`.
pub fn detect_nvim_config() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let xdg = env_path("XDG_CONFIG_HOME");
    let appname = env::var("NVIM_APPNAME").ok();
    find_nvim_config(&nvim_candidates(
        home.as_deref(),
        xdg.as_deref(),
        appname.as_deref(),
    ))
}

/// Locate the user's tmux config file from the environment.
pub fn detect_tmux_config() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let xdg = env_path("XDG_CONFIG_HOME");
    find_tmux_config(&tmux_candidates(home.as_deref(), xdg.as_deref()))
}
