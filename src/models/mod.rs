//! Data models for extracted configuration.
//!
//! This module defines the plain records produced by the extractors:
//! - `Keymap` - A Neovim key binding scoped to a mode
//! - `Plugin` - A Neovim plugin declared in a plugin spec file
//! - `NvimConfig` - Everything extracted from a Neovim config directory
//! - `TmuxKeymap` - A tmux key binding in a key table
//! - `TmuxConfig` - Everything extracted from a tmux config file
//!
//! Records are created fresh on every extraction and are never mutated by
//! the extractors once returned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default Neovim leader key when the config does not set one.
pub const DEFAULT_LEADER: &str = "\\";

/// Default tmux prefix key when the config does not set one.
pub const DEFAULT_PREFIX: &str = "C-b";

/// Key table for bindings that require the prefix key.
pub const PREFIX_TABLE: &str = "prefix";

/// Key table for bindings active without the prefix key (`bind -n`).
pub const ROOT_TABLE: &str = "root";

/// A Neovim keymap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    /// Mode letter(s), e.g. "n", "v", "i", or "nv"
    pub mode: String,

    /// Trigger key sequence (e.g., "<leader>w")
    pub lhs: String,

    /// Target command or reference
    pub rhs: String,

    /// Human description scraped from the `desc` option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// File the keymap was found in
    pub source: PathBuf,
}

impl Keymap {
    /// Readable label for the mode letter(s).
    pub fn mode_name(&self) -> String {
        let names: Vec<&str> = self.mode.chars().map(mode_letter_name).collect();
        names.join("+")
    }
}

fn mode_letter_name(letter: char) -> &'static str {
    match letter {
        'n' => "normal",
        'v' => "visual",
        'x' => "visual-block",
        's' => "select",
        'o' => "operator-pending",
        'i' => "insert",
        'c' => "command-line",
        't' => "terminal",
        _ => "unknown",
    }
}

/// A Neovim plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Repository short name (`repo` of `owner/repo`)
    pub name: String,

    /// False when the declaring file carries a disable marker
    pub enabled: bool,

    /// Opaque per-plugin settings (not resolved)
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl Plugin {
    /// Create a plugin record with an empty config bag.
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
            config: BTreeMap::new(),
        }
    }
}

/// Everything extracted from a Neovim configuration directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NvimConfig {
    /// Leader key
    pub leader: String,

    /// Keymaps in discovery order
    #[serde(default)]
    pub keymaps: Vec<Keymap>,

    /// Plugins in discovery order
    #[serde(default)]
    pub plugins: Vec<Plugin>,

    /// Config directory the data was extracted from
    pub config_path: PathBuf,
}

impl NvimConfig {
    /// Create an empty config with the default leader.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            leader: DEFAULT_LEADER.to_string(),
            keymaps: Vec::new(),
            plugins: Vec::new(),
            config_path: config_path.into(),
        }
    }

    /// Number of plugins not disabled.
    pub fn enabled_plugin_count(&self) -> usize {
        self.plugins.iter().filter(|p| p.enabled).count()
    }
}

/// A tmux key binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxKeymap {
    /// Key name (e.g., "M-Left", "|")
    pub key: String,

    /// Command line bound to the key
    pub command: String,

    /// Derived description, empty when nothing matched
    #[serde(default)]
    pub description: String,

    /// Key table: "prefix", "root", or an explicit `-T` table
    pub table: String,
}

impl TmuxKeymap {
    /// Whether the binding fires without the prefix key.
    pub fn is_root(&self) -> bool {
        self.table == ROOT_TABLE
    }
}

/// Everything extracted from a tmux configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxConfig {
    /// Prefix key
    pub prefix: String,

    /// Key bindings in file order
    #[serde(default)]
    pub keymaps: Vec<TmuxKeymap>,

    /// Options set via `set`/`setw`, last write wins
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    /// Config file the data was extracted from
    pub config_path: PathBuf,
}

impl TmuxConfig {
    /// Create an empty config with the default prefix.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            keymaps: Vec::new(),
            options: BTreeMap::new(),
            config_path: config_path.into(),
        }
    }
}
