//! Precedence resolution for settings.
//!
//! ## Path Precedence (highest to lowest)
//!
//! 1. CLI flags (`--nvim`, `--tmux`)
//! 2. config.kdl (`nvim-path`, `tmux-path`)
//! 3. Auto-detection, unless `auto-detect #false`
//!
//! A path that resolves nowhere stays unset and that side is skipped.
//!
//! ## Cache Directory Precedence
//!
//! 1. `CLIQ_CACHE_DIR` environment variable
//! 2. config.kdl (`cache-dir`)
//! 3. Platform cache directory
//!
//! ## Other Settings
//!
//! CLI flag > config.kdl > built-in default.

use super::paths::{
    CACHE_DIR_ENV, default_cache_dir, detect_nvim_config, detect_tmux_config, env_path,
    expand_home,
};
use super::schema::{CliqConfig, LogLevel};
use crate::Result;
use crate::cache::CacheManager;
use serde::Serialize;
use std::path::PathBuf;

/// Default TTL for the snapshot cache.
pub const DEFAULT_CACHE_TTL_HOURS: u32 = 24;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value found by probing the usual locations
    AutoDetect,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::AutoDetect => write!(f, "auto-detect"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    /// Neovim config directory, if any was found
    pub nvim_path: Option<Resolved<PathBuf>>,
    /// tmux config file, if any was found
    pub tmux_path: Option<Resolved<PathBuf>>,
    /// Whether the snapshot cache is used
    pub cache_enabled: Resolved<bool>,
    /// Cache TTL in hours
    pub cache_ttl_hours: Resolved<u32>,
    /// Directory holding the cache file
    pub cache_dir: Resolved<PathBuf>,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: Resolved<LogLevel>,
}

impl ResolvedSettings {
    pub fn nvim_path(&self) -> Option<&PathBuf> {
        self.nvim_path.as_ref().map(|r| &r.value)
    }

    pub fn tmux_path(&self) -> Option<&PathBuf> {
        self.tmux_path.as_ref().map(|r| &r.value)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.value
    }

    pub fn cache_ttl_hours(&self) -> u32 {
        self.cache_ttl_hours.value
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.value
    }

    /// Path of the cache file.
    pub fn cache_file(&self) -> PathBuf {
        CacheManager::default_path(&self.cache_dir.value)
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--nvim <dir>`
    pub nvim_path: Option<PathBuf>,
    /// `--tmux <file>`
    pub tmux_path: Option<PathBuf>,
    /// `--no-cache`
    pub no_cache: bool,
    /// `--verbose` forces debug
    pub log_level: Option<LogLevel>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Neovim directory override.
    pub fn with_nvim_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.nvim_path = Some(path.into());
        self
    }

    /// Set tmux file override.
    pub fn with_tmux_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tmux_path = Some(path.into());
        self
    }

    /// Disable the cache for this run.
    pub fn with_no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Set log level override.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }
}

/// Resolve settings with full precedence chain.
pub fn resolve_settings(
    config: &CliqConfig,
    overrides: &ConfigOverrides,
) -> Result<ResolvedSettings> {
    let auto_detect = config.auto_detect.unwrap_or(true);

    let nvim_path = resolve_path(
        overrides.nvim_path.clone(),
        config.nvim_path.as_deref(),
        auto_detect.then(detect_nvim_config).flatten(),
    );
    let tmux_path = resolve_path(
        overrides.tmux_path.clone(),
        config.tmux_path.as_deref(),
        auto_detect.then(detect_tmux_config).flatten(),
    );

    let cache_enabled = if overrides.no_cache {
        Resolved::new(false, ValueSource::CliFlag)
    } else if let Some(enabled) = config.cache_enabled {
        Resolved::new(enabled, ValueSource::ConfigFile)
    } else {
        Resolved::new(true, ValueSource::Default)
    };

    let cache_ttl_hours = match config.cache_ttl_hours {
        Some(hours) => Resolved::new(hours, ValueSource::ConfigFile),
        None => Resolved::new(DEFAULT_CACHE_TTL_HOURS, ValueSource::Default),
    };

    let cache_dir = if let Some(dir) = env_path(CACHE_DIR_ENV) {
        Resolved::new(dir, ValueSource::EnvVar(CACHE_DIR_ENV.to_string()))
    } else if let Some(ref dir) = config.cache_dir {
        Resolved::new(expand_home(dir), ValueSource::ConfigFile)
    } else {
        Resolved::new(default_cache_dir()?, ValueSource::Default)
    };

    let log_level = if let Some(level) = overrides.log_level {
        Resolved::new(level, ValueSource::CliFlag)
    } else if let Some(level) = config.log_level {
        Resolved::new(level, ValueSource::ConfigFile)
    } else {
        Resolved::new(LogLevel::default(), ValueSource::Default)
    };

    Ok(ResolvedSettings {
        nvim_path,
        tmux_path,
        cache_enabled,
        cache_ttl_hours,
        cache_dir,
        log_level,
    })
}

fn resolve_path(
    flag: Option<PathBuf>,
    configured: Option<&str>,
    detected: Option<PathBuf>,
) -> Option<Resolved<PathBuf>> {
    if let Some(path) = flag {
        Some(Resolved::new(path, ValueSource::CliFlag))
    } else if let Some(path) = configured {
        Some(Resolved::new(expand_home(path), ValueSource::ConfigFile))
    } else {
        detected.map(|path| Resolved::new(path, ValueSource::AutoDetect))
    }
}
