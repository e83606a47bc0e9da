//! KDL schema for config.kdl.
//!
//! This module provides:
//! - `CliqConfig`, the user settings stored in config.kdl
//! - `LogLevel`, the accepted `log-level` values
//! - Serialization to and from KDL, validation and key-based updates

use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Keys accepted by config.kdl and `cliq config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "nvim-path",
    "tmux-path",
    "auto-detect",
    "cache-enabled",
    "cache-ttl-hours",
    "cache-dir",
    "log-level",
];

/// Verbosity of diagnostic logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    /// Default: only problems the user should know about
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to string representation (also a valid `EnvFilter` directive).
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User settings stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// nvim-path "~/.config/nvim"
/// tmux-path "~/.tmux.conf"
/// auto-detect #true
/// cache-enabled #true
/// cache-ttl-hours 24
/// cache-dir "~/.cache/cliq"
/// log-level "warn"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqConfig {
    /// Neovim config directory (may start with `~`)
    pub nvim_path: Option<String>,

    /// tmux config file (may start with `~`)
    pub tmux_path: Option<String>,

    /// Probe the usual locations when a path is not set
    pub auto_detect: Option<bool>,

    /// Reuse the snapshot cache between runs
    pub cache_enabled: Option<bool>,

    /// Age after which the cache is re-extracted
    pub cache_ttl_hours: Option<u32>,

    /// Directory holding the cache file (may start with `~`)
    pub cache_dir: Option<String>,

    /// Default log level when `RUST_LOG` is not set
    pub log_level: Option<LogLevel>,
}

impl CliqConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.cache_ttl_hours == Some(0) {
            return Err("cache-ttl-hours must be at least 1".to_string());
        }
        for (key, value) in [
            ("nvim-path", &self.nvim_path),
            ("tmux-path", &self.tmux_path),
            ("cache-dir", &self.cache_dir),
        ] {
            if let Some(v) = value
                && v.trim().is_empty()
            {
                return Err(format!("{} must not be empty", key));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Values of the wrong type are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            nvim_path: string_value(doc, "nvim-path"),
            tmux_path: string_value(doc, "tmux-path"),
            auto_detect: first_value(doc, "auto-detect").and_then(KdlValue::as_bool),
            cache_enabled: first_value(doc, "cache-enabled").and_then(KdlValue::as_bool),
            cache_ttl_hours: first_value(doc, "cache-ttl-hours")
                .and_then(KdlValue::as_integer)
                .and_then(|i| u32::try_from(i).ok()),
            cache_dir: string_value(doc, "cache-dir"),
            log_level: string_value(doc, "log-level").and_then(|s| LogLevel::parse(&s)),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref path) = self.nvim_path {
            push_node(&mut doc, "nvim-path", KdlValue::String(path.clone()));
        }
        if let Some(ref path) = self.tmux_path {
            push_node(&mut doc, "tmux-path", KdlValue::String(path.clone()));
        }
        if let Some(enabled) = self.auto_detect {
            push_node(&mut doc, "auto-detect", KdlValue::Bool(enabled));
        }
        if let Some(enabled) = self.cache_enabled {
            push_node(&mut doc, "cache-enabled", KdlValue::Bool(enabled));
        }
        if let Some(hours) = self.cache_ttl_hours {
            push_node(&mut doc, "cache-ttl-hours", KdlValue::Integer(hours as i128));
        }
        if let Some(ref dir) = self.cache_dir {
            push_node(&mut doc, "cache-dir", KdlValue::String(dir.clone()));
        }
        if let Some(level) = self.log_level {
            push_node(&mut doc, "log-level", KdlValue::String(level.as_str().to_string()));
        }

        doc.autoformat();
        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &CliqConfig) {
        if other.nvim_path.is_some() {
            self.nvim_path = other.nvim_path.clone();
        }
        if other.tmux_path.is_some() {
            self.tmux_path = other.tmux_path.clone();
        }
        if other.auto_detect.is_some() {
            self.auto_detect = other.auto_detect;
        }
        if other.cache_enabled.is_some() {
            self.cache_enabled = other.cache_enabled;
        }
        if other.cache_ttl_hours.is_some() {
            self.cache_ttl_hours = other.cache_ttl_hours;
        }
        if other.cache_dir.is_some() {
            self.cache_dir = other.cache_dir.clone();
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    /// Set one value by its config.kdl key, parsing it from text.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "nvim-path" => self.nvim_path = Some(value.to_string()),
            "tmux-path" => self.tmux_path = Some(value.to_string()),
            "auto-detect" => self.auto_detect = Some(parse_bool(key, value)?),
            "cache-enabled" => self.cache_enabled = Some(parse_bool(key, value)?),
            "cache-ttl-hours" => {
                let hours = value.parse::<u32>().map_err(|_| {
                    Error::InvalidInput(format!(
                        "{} must be a positive integer, got '{}'",
                        key, value
                    ))
                })?;
                self.cache_ttl_hours = Some(hours);
            }
            "cache-dir" => self.cache_dir = Some(value.to_string()),
            "log-level" => {
                let level = LogLevel::parse(value).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "Unknown log level '{}'. Use one of: error, warn, info, debug, trace",
                        value
                    ))
                })?;
                self.log_level = Some(level);
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Unknown config key '{}'. Valid keys: {}",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        self.validate().map_err(Error::InvalidInput)
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)?.entries().first().map(KdlEntry::value)
}

fn string_value(doc: &KdlDocument, name: &str) -> Option<String> {
    first_value(doc, name)?.as_string().map(str::to_string)
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}
