//! Cliq - configuration-aware helper for Neovim and tmux users.
//!
//! This library provides the core functionality for the `cliq` CLI tool:
//! lexical extraction of keymaps, plugins and options from Neovim and tmux
//! configuration files, and a JSON snapshot cache with staleness tracking.
//! User configuration is treated as untrusted text and is never executed.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod nvim;
pub mod tmux;

use std::path::PathBuf;


/// Library-level error type for Cliq operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read config source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {} is corrupt: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write cache file {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Cliq operations.
pub type Result<T> = std::result::Result<T, Error>;
