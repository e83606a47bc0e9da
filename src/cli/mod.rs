//! CLI argument definitions for cliq.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cliq - extract and cache keymaps, plugins and options from Neovim and tmux configs.
///
/// Start with `cliq show` to see what was found, or `cliq init` to write a
/// settings file with the detected config locations.
#[derive(Parser, Debug)]
#[command(name = "cliq")]
#[command(
    author,
    version,
    about = "Extract and cache keymaps from Neovim and tmux configs",
    long_about = None
)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Neovim config directory (overrides config.kdl and auto-detection)
    #[arg(long = "nvim", global = true, value_name = "DIR")]
    pub nvim_path: Option<PathBuf>,

    /// tmux config file (overrides config.kdl and auto-detection)
    #[arg(long = "tmux", global = true, value_name = "FILE")]
    pub tmux_path: Option<PathBuf>,

    /// Ignore the snapshot cache for this run
    #[arg(long = "no-cache", global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect config locations and write config.kdl
    Init {
        /// Overwrite an existing config.kdl
        #[arg(long)]
        force: bool,
    },

    /// Show extracted Neovim and tmux configuration
    ///
    /// Uses the snapshot cache when it is fresh, otherwise re-extracts.
    Show {
        /// Which side to show
        #[arg(value_enum, default_value_t = ShowTarget::All)]
        target: ShowTarget,

        /// List every keymap and plugin instead of a sample
        #[arg(long)]
        all: bool,
    },

    /// Re-extract both configs and rewrite the cache
    Reload,

    /// Snapshot cache commands
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Settings commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and build information
    Version,
}

/// Which extracted configuration `show` displays.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShowTarget {
    Nvim,
    Tmux,
    #[default]
    All,
}

impl ShowTarget {
    pub fn includes_nvim(self) -> bool {
        matches!(self, ShowTarget::Nvim | ShowTarget::All)
    }

    pub fn includes_tmux(self) -> bool {
        matches!(self, ShowTarget::Tmux | ShowTarget::All)
    }
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache age, staleness and counts
    Status,

    /// Delete the cache file
    Clear,

    /// Print the cache file path
    Path,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,

    /// Get a value from config.kdl
    Get {
        /// Configuration key (e.g. cache-ttl-hours)
        key: String,
    },

    /// Set a value in config.kdl
    Set {
        /// Configuration key (e.g. cache-ttl-hours)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Print the config.kdl path
    Path,
}
