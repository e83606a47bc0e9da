//! Common test utilities for cliq integration tests.
//!
//! Provides `TestEnv` for isolated test environments that never read the
//! user's real Neovim or tmux configs, or write to `~/.cache/cliq/`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A small init.lua with a space leader and three keymaps.
pub const INIT_LUA: &str = r#"vim.g.mapleader = " "

vim.keymap.set("n", "<leader>w", ":w<CR>", { desc = "Save file" })
vim.keymap.set("n", "<leader>q", ":q<CR>")
vim.keymap.set("i", "jk", "<Esc>")
"#;

/// A tmux.conf with a C-a prefix, two bindings and two options.
pub const TMUX_CONF: &str = r#"# prefix
set -g prefix C-a
unbind C-b

bind r source-file ~/.tmux.conf
bind -n M-h select-pane -L
set -g mouse on
set -g base-index 1
"#;

/// A test environment with isolated home, settings and cache directories.
///
/// The `cliq()` method returns a `Command` with `HOME`, `XDG_CONFIG_HOME`,
/// `CLIQ_CONFIG_DIR` and `CLIQ_CACHE_DIR` set per-invocation, making tests
/// parallel-safe.
pub struct TestEnv {
    pub home_dir: TempDir,
    pub config_dir: TempDir,
    pub cache_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with empty directories.
    pub fn new() -> Self {
        Self {
            home_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            cache_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment with the sample Neovim and tmux configs in
    /// their auto-detected locations.
    pub fn with_fixtures() -> Self {
        let env = Self::new();
        env.write_nvim("init.lua", INIT_LUA);
        env.write_tmux(TMUX_CONF);
        env
    }

    /// Get a Command for the cliq binary with isolated directories.
    pub fn cliq(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cliq"));
        cmd.current_dir(self.home_dir.path());
        cmd.env("HOME", self.home_dir.path());
        cmd.env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"));
        cmd.env("CLIQ_CONFIG_DIR", self.config_dir.path());
        cmd.env("CLIQ_CACHE_DIR", self.cache_dir.path());
        cmd.env_remove("NVIM_APPNAME");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Auto-detected Neovim config directory.
    pub fn nvim_dir(&self) -> PathBuf {
        self.home_dir.path().join(".config").join("nvim")
    }

    /// Auto-detected tmux config file.
    pub fn tmux_conf(&self) -> PathBuf {
        self.home_dir.path().join(".tmux.conf")
    }

    /// Path of config.kdl inside the isolated settings directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.path().join("config.kdl")
    }

    /// Path of the snapshot cache inside the isolated cache directory.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.path().join("config-cache.json")
    }

    /// Write a file relative to the Neovim config directory, creating parents.
    pub fn write_nvim(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.nvim_dir().join(rel);
        write_file(&path, content);
        path
    }

    /// Write the tmux config file.
    pub fn write_tmux(&self, content: &str) -> PathBuf {
        let path = self.tmux_conf();
        write_file(&path, content);
        path
    }

    /// Write config.kdl directly.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let path = self.config_file();
        write_file(&path, content);
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Parse a command's stdout as JSON.
pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is not valid JSON")
}
