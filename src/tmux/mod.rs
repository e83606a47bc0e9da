//! tmux configuration extraction.
//!
//! tmux config is line oriented, so each physical line is dispatched to the
//! small parsers in [`parser`]: prefix assignment, key bindings and options.
//! A line may feed more than one of them (e.g. `set -g prefix C-a` is both a
//! prefix assignment and an option).

pub mod describe;
pub mod parser;

use crate::models::TmuxConfig;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extract prefix, bindings and options from a tmux config file.
///
/// Fails only when the file cannot be read.
pub fn extract_tmux_config(path: &Path) -> Result<TmuxConfig> {
    let bytes = fs::read(path).map_err(|source| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let cfg = parse_tmux_config(&text, path);

    debug!(
        path = %path.display(),
        prefix = %cfg.prefix,
        keymaps = cfg.keymaps.len(),
        options = cfg.options.len(),
        "Extracted tmux config"
    );
    Ok(cfg)
}

/// Parse tmux config text that has already been read.
///
/// Continuation markers are stripped but lines are not joined, so a
/// directive split across lines is seen as separate fragments.
pub fn parse_tmux_config(text: &str, path: &Path) -> TmuxConfig {
    let mut cfg = TmuxConfig::new(path);

    for raw in text.lines() {
        let mut line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        while let Some(stripped) = line.strip_suffix('\\') {
            line = stripped.trim_end();
        }
        if line.is_empty() {
            continue;
        }

        if line.contains("prefix")
            && let Some(prefix) = parser::parse_prefix(line)
        {
            cfg.prefix = prefix;
        }

        if let Some(keymap) = parser::parse_binding(line) {
            cfg.keymaps.push(keymap);
        }

        if let Some((name, value)) = parser::parse_option(line) {
            cfg.options.insert(name, value);
        }
    }

    cfg
}
