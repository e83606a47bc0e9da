//! Neovim configuration extraction.
//!
//! Reads a config directory and returns an [`NvimConfig`] populated from:
//! - `init.lua` (leader, `vim.keymap.set`, `vim.cmd` mappings)
//! - `init.vim` (`let mapleader`, `[mode][nore]map` lines)
//! - plugin spec files under the usual plugin-manager directories
//!
//! Extraction is best effort. Unreadable files are logged and skipped, and a
//! missing directory simply produces the default model.

pub mod lua;
pub mod plugins;
pub mod vimscript;

use crate::models::NvimConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Plugin spec directories relative to the config root, scanned in order.
pub const PLUGIN_DIRS: &[&str] = &[
    "lua/plugins",
    "lua/config/plugins",
    "lua/user/plugins",
    "after/plugin",
];

/// Extension of plugin spec files.
const PLUGIN_EXTENSION: &str = "lua";

/// Extract keymaps, leader and plugins from a Neovim config directory.
///
/// Never fails on content: a file that cannot be read is skipped, and a
/// directory that does not exist yields the default leader and no records.
pub fn extract_nvim_config(config_dir: &Path) -> NvimConfig {
    let mut cfg = NvimConfig::new(config_dir);

    if !config_dir.is_dir() {
        debug!(path = %config_dir.display(), "Neovim config directory not found");
        return cfg;
    }

    let init_lua = config_dir.join("init.lua");
    if let Some(text) = read_source(&init_lua) {
        lua::scan_init(&text, &init_lua, &mut cfg.leader, &mut cfg.keymaps);
    }

    let init_vim = config_dir.join("init.vim");
    if let Some(text) = read_source(&init_vim) {
        vimscript::scan_init(&text, &init_vim, &mut cfg.leader, &mut cfg.keymaps);
    }

    for rel in PLUGIN_DIRS {
        let dir = config_dir.join(rel);
        if dir.is_dir() {
            scan_plugin_dir(&dir, &mut cfg);
        }
    }

    debug!(
        path = %config_dir.display(),
        leader = %cfg.leader,
        keymaps = cfg.keymaps.len(),
        plugins = cfg.plugins.len(),
        "Extracted Neovim config"
    );
    cfg
}

/// Scan every plugin spec file in `dir` for plugins and embedded keymaps.
fn scan_plugin_dir(dir: &Path, cfg: &mut NvimConfig) {
    for path in plugin_files(dir) {
        let Some(text) = read_source(&path) else {
            continue;
        };
        cfg.plugins.extend(plugins::extract_plugins(&text));
        lua::extract_keymaps(&text, &path, &mut cfg.keymaps);
    }
}

/// Regular `.lua` files directly inside `dir`, sorted by file name.
fn plugin_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot list plugin directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(PLUGIN_EXTENSION)
        })
        .collect();
    files.sort();
    files
}

/// Read a source file, tolerating invalid UTF-8.
///
/// Returns `None` when the file is missing or unreadable.
fn read_source(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
            None
        }
    }
}
