//! Command implementations for the cliq CLI.
//!
//! Each command returns a result struct implementing [`Output`], which the
//! binary prints as JSON (default) or human-readable text (`-H`).
//! - `load_configs` - Cache-first extraction used by `show`
//! - `show` / `reload` - Display or refresh extracted configuration
//! - `cache_*` - Inspect and clear the snapshot cache
//! - `config_*` / `init` - Manage config.kdl
//! - `version` - Build information

use crate::cache::{Cache, CacheManager, CacheSummary};
use crate::cli::ShowTarget;
use crate::config::resolver::DEFAULT_CACHE_TTL_HOURS;
use crate::config::{
    self, CONFIG_KEYS, CliqConfig, LogLevel, Resolved, ResolvedSettings, ValueSource,
    config_file_path, read_config,
};
use crate::models::{NvimConfig, PREFIX_TABLE, TmuxConfig};
use crate::nvim::extract_nvim_config;
use crate::tmux::extract_tmux_config;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Keymaps listed per side by `show` unless `--all` is given.
pub const SAMPLE_KEYMAPS: usize = 5;

/// Plugins listed by `show` unless `--all` is given.
pub const SAMPLE_PLUGINS: usize = 10;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Render a leader or prefix so whitespace keys stay visible.
fn key_label(key: &str) -> String {
    match key {
        " " => "<Space>".to_string(),
        "\t" => "<Tab>".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Cache-first loading
// ============================================================================

/// Extracted configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfigs {
    pub nvim: Option<NvimConfig>,
    pub tmux: Option<TmuxConfig>,
    /// True when nothing had to be re-extracted
    pub from_cache: bool,
}

/// Load configs, preferring a fresh cache snapshot.
///
/// With the cache enabled, a snapshot younger than the TTL is reused when
/// both of its sides were extracted from the currently resolved paths.
/// Otherwise both sides are re-extracted and the snapshot is replaced as a
/// whole, so a cached side never outlives its TTL.
/// Only the TTL is consulted here; modification times are reported by
/// `cache status` but do not trigger re-extraction.
///
/// Cache and extraction problems are logged as warnings and never fail the
/// command.
pub fn load_configs(settings: &ResolvedSettings) -> LoadedConfigs {
    let mut cache = settings
        .cache_enabled()
        .then(|| CacheManager::new(settings.cache_file()));

    if let Some(manager) = cache.as_mut() {
        let matches = match manager.load() {
            Ok(snapshot) => snapshot_matches(snapshot, settings),
            Err(e) => {
                warn!(error = %e, "Ignoring unusable cache");
                false
            }
        };
        if !matches {
            debug!(path = %manager.path().display(), "Cache does not cover the resolved paths");
        } else if manager.is_stale(settings.cache_ttl_hours()) {
            debug!(path = %manager.path().display(), "Cache is stale");
        } else {
            let snapshot = manager.snapshot();
            return LoadedConfigs {
                nvim: snapshot.nvim_config.clone(),
                tmux: snapshot.tmux_config.clone(),
                from_cache: true,
            };
        }
    }

    let nvim = settings.nvim_path().map(|dir| extract_nvim_config(dir));
    let tmux = settings
        .tmux_path()
        .and_then(|path| match extract_tmux_config(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(error = %e, "Could not parse tmux config");
                None
            }
        });

    let attempted = settings.nvim_path().is_some() || settings.tmux_path().is_some();
    if attempted && let Some(manager) = cache.as_mut() {
        let mut snapshot = Cache::new(nvim.clone(), tmux.clone());
        snapshot.record_source_hashes();
        if let Err(e) = manager.save(snapshot) {
            warn!(error = %e, "Could not save cache");
        }
    }

    LoadedConfigs {
        nvim,
        tmux,
        from_cache: false,
    }
}

/// Whether every side of `snapshot` came from the resolved config paths.
///
/// A side that is resolved but missing from the snapshot (for example an
/// unreadable tmux file) counts as a mismatch.
fn snapshot_matches(snapshot: &Cache, settings: &ResolvedSettings) -> bool {
    let nvim_path = snapshot.nvim_config.as_ref().map(|c| &c.config_path);
    let tmux_path = snapshot.tmux_config.as_ref().map(|c| &c.config_path);
    nvim_path == settings.nvim_path() && tmux_path == settings.tmux_path()
}

// ============================================================================
// show
// ============================================================================

/// Result of `cliq show`.
#[derive(Serialize)]
pub struct ShowResult {
    #[serde(skip)]
    pub target: ShowTarget,
    #[serde(skip)]
    pub all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim: Option<NvimConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux: Option<TmuxConfig>,
    pub from_cache: bool,
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut sections = Vec::new();
        if self.target.includes_nvim() {
            sections.push(format_nvim(self.nvim.as_ref(), self.all));
        }
        if self.target.includes_tmux() {
            sections.push(format_tmux(self.tmux.as_ref(), self.all));
        }
        sections.join("\n\n")
    }
}

fn format_nvim(cfg: Option<&NvimConfig>, all: bool) -> String {
    let mut lines = vec!["--- Neovim Configuration ---".to_string()];
    let Some(cfg) = cfg else {
        lines.push("  No Neovim configuration detected".to_string());
        return lines.join("\n");
    };

    lines.push(format!("Config Path: {}", cfg.config_path.display()));
    lines.push(format!("Leader Key: {}", key_label(&cfg.leader)));
    lines.push(format!("Keymaps Found: {}", cfg.keymaps.len()));
    lines.push(format!(
        "Plugins Found: {} ({} enabled)",
        cfg.plugins.len(),
        cfg.enabled_plugin_count()
    ));

    if !cfg.keymaps.is_empty() {
        lines.push(String::new());
        lines.push(if all { "Keymaps:" } else { "Sample Keymaps:" }.to_string());
        let limit = if all { cfg.keymaps.len() } else { SAMPLE_KEYMAPS };
        for km in cfg.keymaps.iter().take(limit) {
            let mut line = format!("  [{}] {} -> {}", km.mode_name(), km.lhs, km.rhs);
            if let Some(ref desc) = km.description {
                line.push_str(&format!("  ({})", desc));
            }
            lines.push(line);
        }
        if cfg.keymaps.len() > limit {
            lines.push(format!("  ... and {} more", cfg.keymaps.len() - limit));
        }
    }

    if !cfg.plugins.is_empty() {
        lines.push(String::new());
        lines.push("Detected Plugins:".to_string());
        let limit = if all { cfg.plugins.len() } else { SAMPLE_PLUGINS };
        for plugin in cfg.plugins.iter().take(limit) {
            let status = if plugin.enabled { "enabled" } else { "disabled" };
            lines.push(format!("  {} ({})", plugin.name, status));
        }
        if cfg.plugins.len() > limit {
            lines.push(format!("  ... and {} more", cfg.plugins.len() - limit));
        }
    }

    lines.join("\n")
}

fn format_tmux(cfg: Option<&TmuxConfig>, all: bool) -> String {
    let mut lines = vec!["--- Tmux Configuration ---".to_string()];
    let Some(cfg) = cfg else {
        lines.push("  No tmux configuration detected".to_string());
        return lines.join("\n");
    };

    lines.push(format!("Config Path: {}", cfg.config_path.display()));
    lines.push(format!("Prefix: {}", key_label(&cfg.prefix)));
    lines.push(format!("Keymaps Found: {}", cfg.keymaps.len()));
    lines.push(format!("Options Set: {}", cfg.options.len()));

    if !cfg.keymaps.is_empty() {
        lines.push(String::new());
        lines.push(if all { "Keymaps:" } else { "Sample Keymaps:" }.to_string());
        let limit = if all { cfg.keymaps.len() } else { SAMPLE_KEYMAPS };
        for km in cfg.keymaps.iter().take(limit) {
            let chord = if km.is_root() {
                km.key.clone()
            } else if km.table == PREFIX_TABLE {
                format!("{} {}", key_label(&cfg.prefix), km.key)
            } else {
                format!("[{}] {}", km.table, km.key)
            };
            let mut line = format!("  {} -> {}", chord, km.command);
            if !km.description.is_empty() {
                line.push_str(&format!("  ({})", km.description));
            }
            lines.push(line);
        }
        if cfg.keymaps.len() > limit {
            lines.push(format!("  ... and {} more", cfg.keymaps.len() - limit));
        }
    }

    lines.join("\n")
}

/// Show extracted configuration for `target`.
pub fn show(settings: &ResolvedSettings, target: ShowTarget, all: bool) -> Result<ShowResult> {
    let loaded = load_configs(settings);
    Ok(ShowResult {
        target,
        all,
        nvim: loaded.nvim.filter(|_| target.includes_nvim()),
        tmux: loaded.tmux.filter(|_| target.includes_tmux()),
        from_cache: loaded.from_cache,
    })
}

// ============================================================================
// reload
// ============================================================================

/// Result of `cliq reload`.
#[derive(Serialize)]
pub struct ReloadResult {
    pub cache_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim_keymaps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim_plugins: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux_keymaps: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux_prefix: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Output for ReloadResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec!["Reloading configurations...".to_string()];
        match (self.nvim_keymaps, self.nvim_plugins) {
            (Some(keymaps), Some(plugins)) => lines.push(format!(
                "  ✓ Neovim config parsed ({} keymaps, {} plugins)",
                keymaps, plugins
            )),
            _ => lines.push("  - No Neovim configuration".to_string()),
        }
        match (self.tmux_keymaps, &self.tmux_prefix) {
            (Some(keymaps), Some(prefix)) => lines.push(format!(
                "  ✓ Tmux config parsed ({} keymaps, prefix {})",
                keymaps,
                key_label(prefix)
            )),
            _ => lines.push("  - No tmux configuration".to_string()),
        }
        for warning in &self.warnings {
            lines.push(format!("  ! {}", warning));
        }
        lines.push(format!("  ✓ Cache updated: {}", self.cache_path.display()));
        lines.join("\n")
    }
}

/// Re-extract both sides and rewrite the cache, ignoring its age.
///
/// The cache is written even when it is disabled for queries, so a later
/// run with the cache enabled starts warm. A failed write is an error.
pub fn reload(settings: &ResolvedSettings) -> Result<ReloadResult> {
    let mut warnings = Vec::new();

    let nvim = settings.nvim_path().map(|dir| extract_nvim_config(dir));
    let tmux = match settings.tmux_path() {
        Some(path) => match extract_tmux_config(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(error = %e, "Could not parse tmux config");
                warnings.push(format!("could not parse tmux config: {}", e));
                None
            }
        },
        None => None,
    };

    let mut snapshot = Cache::new(nvim, tmux);
    snapshot.record_source_hashes();
    let mut manager = CacheManager::new(settings.cache_file());
    manager.save(snapshot)?;

    let snapshot = manager.snapshot();
    let nvim = snapshot.nvim_config.as_ref();
    let tmux = snapshot.tmux_config.as_ref();
    Ok(ReloadResult {
        cache_path: manager.path().to_path_buf(),
        nvim_keymaps: nvim.map(|c| c.keymaps.len()),
        nvim_plugins: nvim.map(|c| c.plugins.len()),
        tmux_keymaps: tmux.map(|c| c.keymaps.len()),
        tmux_prefix: tmux.map(|c| c.prefix.clone()),
        warnings,
    })
}

// ============================================================================
// cache
// ============================================================================

/// Result of `cliq cache status`.
#[derive(Serialize)]
pub struct CacheStatusResult {
    pub enabled: bool,
    pub ttl_hours: u32,
    /// Stale against the configured TTL
    pub is_stale: bool,
    #[serde(flatten)]
    pub summary: CacheSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Output for CacheStatusResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.summary;
        let mut lines = vec![format!("Cache: {}", s.path.display())];
        if let Some(ref error) = self.error {
            lines.push(format!("  Unreadable: {}", error));
            lines.push("  Run 'cliq cache clear' to reset it.".to_string());
            return lines.join("\n");
        }
        if !s.exists {
            lines.push("  No cache file yet".to_string());
            return lines.join("\n");
        }

        lines.push(format!(
            "  Enabled: {}",
            if self.enabled { "yes" } else { "no" }
        ));
        match s.last_parsed {
            Some(at) => lines.push(format!("  Last parsed: {}", at.to_rfc3339())),
            None => lines.push("  Last parsed: never".to_string()),
        }
        lines.push(format!(
            "  Stale (TTL {}h): {}",
            self.ttl_hours,
            if self.is_stale { "yes" } else { "no" }
        ));
        lines.push(format!(
            "  Sources modified since: {}",
            if s.needs_refresh { "yes" } else { "no" }
        ));
        if let (Some(leader), Some(keymaps), Some(plugins)) =
            (&s.nvim_leader, s.nvim_keymaps_count, s.nvim_plugins_count)
        {
            lines.push(format!(
                "  Neovim: leader {}, {} keymaps, {} plugins",
                key_label(leader),
                keymaps,
                plugins
            ));
        }
        if let (Some(prefix), Some(keymaps)) = (&s.tmux_prefix, s.tmux_keymaps_count) {
            lines.push(format!(
                "  Tmux: prefix {}, {} keymaps",
                key_label(prefix),
                keymaps
            ));
        }
        lines.join("\n")
    }
}

/// Report cache age, staleness and contents.
///
/// A corrupt cache file is reported, not raised.
pub fn cache_status(settings: &ResolvedSettings) -> Result<CacheStatusResult> {
    let mut manager = CacheManager::new(settings.cache_file());
    let error = match manager.load() {
        Ok(_) => None,
        Err(e @ Error::CacheCorrupt { .. }) => Some(e.to_string()),
        Err(e) => return Err(e),
    };

    Ok(CacheStatusResult {
        enabled: settings.cache_enabled(),
        ttl_hours: settings.cache_ttl_hours(),
        is_stale: manager.is_stale(settings.cache_ttl_hours()),
        summary: manager.summary(),
        error,
    })
}

/// Result of `cliq cache clear`.
#[derive(Serialize)]
pub struct CacheClearResult {
    pub path: PathBuf,
    pub removed: bool,
}

impl Output for CacheClearResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.removed {
            format!("Removed cache {}", self.path.display())
        } else {
            format!("No cache at {}", self.path.display())
        }
    }
}

/// Delete the cache file.
pub fn cache_clear(settings: &ResolvedSettings) -> Result<CacheClearResult> {
    let path = settings.cache_file();
    let removed = path.exists();
    CacheManager::new(&path).clear()?;
    Ok(CacheClearResult { path, removed })
}

/// A single path, printed bare in human mode.
#[derive(Serialize)]
pub struct PathResult {
    pub path: PathBuf,
    pub exists: bool,
}

impl PathResult {
    fn new(path: PathBuf) -> Self {
        let exists = path.exists();
        Self { path, exists }
    }
}

impl Output for PathResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.path.display().to_string()
    }
}

/// Path of the cache file.
pub fn cache_path(settings: &ResolvedSettings) -> Result<PathResult> {
    Ok(PathResult::new(settings.cache_file()))
}

// ============================================================================
// config
// ============================================================================

/// Result of `cliq config show`.
#[derive(Serialize)]
pub struct ConfigShowResult {
    pub config_file: PathBuf,
    pub config_file_exists: bool,
    pub settings: ResolvedSettings,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        let exists = if self.config_file_exists { "" } else { " (not created)" };
        let mut lines = vec![format!("Config File: {}{}", self.config_file.display(), exists)];

        let path_line = |label: &str, value: &Option<Resolved<PathBuf>>| match value {
            Some(r) => format!("  {}: {} [{}]", label, r.value.display(), r.source),
            None => format!("  {}: (not found)", label),
        };
        lines.push(path_line("nvim-path", &s.nvim_path));
        lines.push(path_line("tmux-path", &s.tmux_path));
        lines.push(format!(
            "  cache-enabled: {} [{}]",
            s.cache_enabled.value, s.cache_enabled.source
        ));
        lines.push(format!(
            "  cache-ttl-hours: {} [{}]",
            s.cache_ttl_hours.value, s.cache_ttl_hours.source
        ));
        lines.push(format!(
            "  cache-dir: {} [{}]",
            s.cache_dir.value.display(),
            s.cache_dir.source
        ));
        lines.push(format!(
            "  log-level: {} [{}]",
            s.log_level.value, s.log_level.source
        ));
        lines.join("\n")
    }
}

/// Show resolved settings with their sources.
pub fn config_show(settings: &ResolvedSettings) -> Result<ConfigShowResult> {
    let config_file = config_file_path()?;
    Ok(ConfigShowResult {
        config_file_exists: config_file.exists(),
        config_file,
        settings: settings.clone(),
    })
}

/// Path of config.kdl.
pub fn config_path() -> Result<PathResult> {
    Ok(PathResult::new(config_file_path()?))
}

/// Result of `cliq config get`.
#[derive(Serialize)]
pub struct ConfigGetResult {
    pub key: String,
    pub value: Option<String>,
}

impl Output for ConfigGetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.value {
            Some(ref value) => value.clone(),
            None => format!("{} is not set", self.key),
        }
    }
}

/// Read one value as written in config.kdl (no defaults or validation applied).
pub fn config_get(key: &str) -> Result<ConfigGetResult> {
    let cfg = read_config()?;
    let value = match key {
        "nvim-path" => cfg.nvim_path,
        "tmux-path" => cfg.tmux_path,
        "auto-detect" => cfg.auto_detect.map(|v| v.to_string()),
        "cache-enabled" => cfg.cache_enabled.map(|v| v.to_string()),
        "cache-ttl-hours" => cfg.cache_ttl_hours.map(|v| v.to_string()),
        "cache-dir" => cfg.cache_dir,
        "log-level" => cfg.log_level.map(|v| v.to_string()),
        _ => {
            return Err(Error::InvalidInput(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            )));
        }
    };
    Ok(ConfigGetResult {
        key: key.to_string(),
        value,
    })
}

/// Result of `cliq config set`.
#[derive(Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
    pub path: PathBuf,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path.display())
    }
}

/// Update one value in config.kdl, creating the file if needed.
pub fn config_set(key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut cfg = read_config()?;
    cfg.set_value(key, value)?;
    let path = config::save_config(&cfg)?;
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
        path,
    })
}

// ============================================================================
// init
// ============================================================================

/// Result of `cliq init`.
#[derive(Serialize)]
pub struct InitResult {
    pub config_file: PathBuf,
    pub overwritten: bool,
    pub nvim_path: Option<PathBuf>,
    pub tmux_path: Option<PathBuf>,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.overwritten { "Rewrote" } else { "Created" };
        let mut lines = vec![format!("{} {}", verb, self.config_file.display())];
        let found = |label: &str, path: &Option<PathBuf>| match path {
            Some(p) => format!("  ✓ {}: {}", label, p.display()),
            None => format!("  - {}: not found", label),
        };
        lines.push(found("Neovim config", &self.nvim_path));
        lines.push(found("tmux config", &self.tmux_path));
        lines.push("Run 'cliq show -H' to see what was extracted.".to_string());
        lines.join("\n")
    }
}

/// Write config.kdl with the resolved config locations and default policy.
///
/// Refuses to replace an existing file unless `force` is set. With `force`,
/// values already in the file are kept; only missing ones are filled in.
pub fn init(settings: &ResolvedSettings, force: bool) -> Result<InitResult> {
    let path = config_file_path()?;
    init_at(&path, settings, force)
}

fn init_at(path: &Path, settings: &ResolvedSettings, force: bool) -> Result<InitResult> {
    let overwritten = path.exists();
    if overwritten && !force {
        return Err(Error::InvalidInput(format!(
            "{} already exists. Use --force to overwrite it",
            path.display()
        )));
    }

    let existing = config::read_config_from(path)?;
    let mut cfg = CliqConfig {
        auto_detect: Some(true),
        cache_enabled: Some(true),
        cache_ttl_hours: Some(DEFAULT_CACHE_TTL_HOURS),
        log_level: Some(LogLevel::default()),
        ..Default::default()
    };
    cfg.merge(&existing);
    cfg.nvim_path = path_entry(settings.nvim_path.as_ref(), existing.nvim_path);
    cfg.tmux_path = path_entry(settings.tmux_path.as_ref(), existing.tmux_path);
    config::save_config_to(&cfg, path)?;

    Ok(InitResult {
        config_file: path.to_path_buf(),
        overwritten,
        nvim_path: settings.nvim_path().cloned(),
        tmux_path: settings.tmux_path().cloned(),
    })
}

/// Path to write for one side: the file's own spelling when the value came
/// from config.kdl, else the resolved path.
fn path_entry(resolved: Option<&Resolved<PathBuf>>, configured: Option<String>) -> Option<String> {
    match resolved {
        Some(r) if r.source != ValueSource::ConfigFile => Some(r.value.display().to_string()),
        _ => configured,
    }
}

// ============================================================================
// version
// ============================================================================

/// Result of `cliq version`.
#[derive(Serialize)]
pub struct VersionResult {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl Output for VersionResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "cliq {} ({}, built {})",
            self.version, self.commit, self.built
        )
    }
}

/// Version and build information.
pub fn version() -> VersionResult {
    VersionResult {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("CLIQ_GIT_COMMIT"),
        built: env!("CLIQ_BUILD_TIMESTAMP"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn settings_for(env: &TestEnv, cache_enabled: bool) -> ResolvedSettings {
        ResolvedSettings {
            nvim_path: Some(Resolved::new(env.nvim_dir(), ValueSource::CliFlag)),
            tmux_path: Some(Resolved::new(env.tmux_conf(), ValueSource::CliFlag)),
            cache_enabled: Resolved::new(cache_enabled, ValueSource::Default),
            cache_ttl_hours: Resolved::new(24, ValueSource::Default),
            cache_dir: Resolved::new(env.cache_dir.path().to_path_buf(), ValueSource::Default),
            log_level: Resolved::new(LogLevel::Warn, ValueSource::Default),
        }
    }

    fn write_fixtures(env: &TestEnv) {
        env.write_nvim(
            "init.lua",
            r#"vim.g.mapleader = " "
vim.keymap.set("n", "<leader>w", ":w<CR>", { desc = "Save file" })
"#,
        );
        env.write_tmux("set -g prefix C-a\nbind | split-window -h\n");
    }

    #[test]
    fn test_load_configs_extracts_then_reuses_cache() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let settings = settings_for(&env, true);

        let first = load_configs(&settings);
        assert!(!first.from_cache);
        assert_eq!(first.nvim.as_ref().unwrap().leader, " ");
        assert_eq!(first.tmux.as_ref().unwrap().prefix, "C-a");
        assert!(env.cache_file().exists());

        // Edits are not picked up while the snapshot is fresh.
        env.write_tmux("set -g prefix C-s\n");
        let second = load_configs(&settings);
        assert!(second.from_cache);
        assert_eq!(second.tmux.unwrap().prefix, "C-a");
    }

    #[test]
    fn test_load_configs_without_cache() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let settings = settings_for(&env, false);

        let loaded = load_configs(&settings);
        assert!(!loaded.from_cache);
        assert!(loaded.nvim.is_some());
        assert!(!env.cache_file().exists());
    }

    #[test]
    fn test_load_configs_ignores_cache_for_other_paths() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let settings = settings_for(&env, true);
        load_configs(&settings);

        let other = TestEnv::new();
        other.write_tmux("set -g prefix C-q\n");
        let mut moved = settings.clone();
        moved.tmux_path = Some(Resolved::new(other.tmux_conf(), ValueSource::CliFlag));

        let loaded = load_configs(&moved);
        assert_eq!(loaded.tmux.unwrap().prefix, "C-q");
        assert!(!loaded.from_cache);
    }

    #[test]
    fn test_load_configs_partial_snapshot_reextracts_both_sides() {
        let env = TestEnv::new();
        env.write_nvim("init.lua", "vim.g.mapleader = ','\n");
        let settings = settings_for(&env, true);

        // The tmux file is missing, so the snapshot only holds the nvim side.
        let first = load_configs(&settings);
        assert_eq!(first.nvim.unwrap().leader, ",");
        assert!(first.tmux.is_none());

        env.write_nvim("init.lua", "vim.g.mapleader = ';'\n");
        let second = load_configs(&settings);
        assert!(!second.from_cache);
        assert_eq!(second.nvim.unwrap().leader, ";");

        let mut manager = CacheManager::new(env.cache_file());
        let saved = manager.load().unwrap();
        assert_eq!(saved.nvim_config.as_ref().unwrap().leader, ";");
        assert!(saved.tmux_config.is_none());
    }

    #[test]
    fn test_load_configs_survives_corrupt_cache() {
        let env = TestEnv::new();
        write_fixtures(&env);
        std::fs::write(env.cache_file(), "garbage").unwrap();

        let loaded = load_configs(&settings_for(&env, true));
        assert!(loaded.tmux.is_some());
        // The corrupt file was replaced by a fresh snapshot.
        let mut manager = CacheManager::new(env.cache_file());
        assert!(manager.load().is_ok());
    }

    #[test]
    fn test_load_configs_missing_tmux_file_is_warning() {
        let env = TestEnv::new();
        env.write_nvim("init.vim", "nnoremap a b\n");
        let loaded = load_configs(&settings_for(&env, false));
        assert!(loaded.tmux.is_none());
        assert_eq!(loaded.nvim.unwrap().keymaps.len(), 1);
    }

    #[test]
    fn test_show_human_truncates_samples() {
        let env = TestEnv::new();
        let mut init = String::new();
        for i in 0..8 {
            init.push_str(&format!("vim.keymap.set('n', '<leader>{}', ':echo {}<CR>')\n", i, i));
        }
        env.write_nvim("init.lua", &init);
        let mut plugins = String::from("return {\n");
        for i in 0..12 {
            plugins.push_str(&format!("  'owner/plugin-{}.nvim',\n", i));
        }
        plugins.push('}');
        env.write_nvim("lua/plugins/all.lua", &plugins);

        let settings = settings_for(&env, false);
        let result = show(&settings, ShowTarget::Nvim, false).unwrap();
        let human = result.to_human();
        assert!(human.contains("Keymaps Found: 8"));
        assert!(human.contains("... and 3 more"));
        assert!(human.contains("... and 2 more"));
        assert!(!human.contains("Tmux Configuration"));

        let full = show(&settings, ShowTarget::Nvim, true).unwrap().to_human();
        assert!(!full.contains("... and"));
        assert!(full.contains("plugin-11.nvim"));

        let value: serde_json::Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(value["nvim"]["keymaps"].as_array().unwrap().len(), 8);
        assert!(value.get("tmux").is_none());
    }

    #[test]
    fn test_show_human_reports_missing_side() {
        let env = TestEnv::new();
        let mut settings = settings_for(&env, false);
        settings.nvim_path = None;
        let human = show(&settings, ShowTarget::All, false).unwrap().to_human();
        assert!(human.contains("No Neovim configuration detected"));
        assert!(human.contains("No tmux configuration detected"));
    }

    #[test]
    fn test_reload_writes_cache_even_when_disabled() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let result = reload(&settings_for(&env, false)).unwrap();
        assert_eq!(result.nvim_keymaps, Some(1));
        assert_eq!(result.tmux_prefix.as_deref(), Some("C-a"));
        assert!(result.warnings.is_empty());
        assert!(env.cache_file().exists());
    }

    #[test]
    fn test_reload_reports_unreadable_tmux() {
        let env = TestEnv::new();
        env.write_nvim("init.lua", "");
        let result = reload(&settings_for(&env, true)).unwrap();
        assert_eq!(result.tmux_keymaps, None);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.to_human().contains("No tmux configuration"));
    }

    #[test]
    fn test_cache_status_and_clear() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let settings = settings_for(&env, true);

        let empty = cache_status(&settings).unwrap();
        assert!(!empty.summary.exists);
        assert!(empty.is_stale);

        reload(&settings).unwrap();
        let status = cache_status(&settings).unwrap();
        assert!(status.summary.exists);
        assert!(!status.is_stale);
        assert_eq!(status.summary.tmux_prefix.as_deref(), Some("C-a"));
        assert!(status.to_human().contains("Tmux: prefix C-a, 1 keymaps"));

        let cleared = cache_clear(&settings).unwrap();
        assert!(cleared.removed);
        assert!(!cache_clear(&settings).unwrap().removed);
    }

    #[test]
    fn test_cache_status_reports_corruption() {
        let env = TestEnv::new();
        std::fs::write(env.cache_file(), "{").unwrap();
        let status = cache_status(&settings_for(&env, true)).unwrap();
        assert!(status.error.is_some());
        assert!(status.to_human().contains("cliq cache clear"));
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let settings = settings_for(&env, true);
        let path = env.home_dir.path().join("cliq/config.kdl");

        let created = init_at(&path, &settings, false).unwrap();
        assert!(!created.overwritten);
        let written = config::load_config_from(&path).unwrap();
        assert_eq!(
            written.tmux_path.as_deref(),
            Some(env.tmux_conf().display().to_string().as_str())
        );
        assert_eq!(written.cache_ttl_hours, Some(24));

        assert!(matches!(
            init_at(&path, &settings, false),
            Err(Error::InvalidInput(_))
        ));
        assert!(init_at(&path, &settings, true).unwrap().overwritten);
    }

    #[test]
    fn test_init_force_keeps_existing_values() {
        let env = TestEnv::new();
        write_fixtures(&env);
        let path = env.home_dir.path().join("cliq/config.kdl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "auto-detect #false\ncache-dir \"~/scratch/cliq\"\ncache-ttl-hours 6\n",
        )
        .unwrap();

        let result = init_at(&path, &settings_for(&env, true), true).unwrap();
        assert!(result.overwritten);

        let written = config::load_config_from(&path).unwrap();
        assert_eq!(written.auto_detect, Some(false));
        assert_eq!(written.cache_dir.as_deref(), Some("~/scratch/cliq"));
        assert_eq!(written.cache_ttl_hours, Some(6));
        assert_eq!(written.cache_enabled, Some(true));
        assert_eq!(
            written.nvim_path.as_deref(),
            Some(env.nvim_dir().display().to_string().as_str())
        );
    }

    #[test]
    fn test_init_keeps_configured_path_spelling() {
        let env = TestEnv::new();
        let path = env.home_dir.path().join("cliq/config.kdl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "tmux-path \"~/.tmux.conf\"\n").unwrap();

        let mut settings = settings_for(&env, true);
        settings.tmux_path = Some(Resolved::new(env.tmux_conf(), ValueSource::ConfigFile));
        init_at(&path, &settings, true).unwrap();

        let written = config::load_config_from(&path).unwrap();
        assert_eq!(written.tmux_path.as_deref(), Some("~/.tmux.conf"));
    }

    #[test]
    fn test_show_human_labels() {
        let env = TestEnv::new();
        env.write_nvim("init.lua", r#"vim.keymap.set({ "n", "v" }, "<leader>y", '"+y')"#);
        env.write_tmux(
            "set -g prefix C-a
bind r source-file ~/.tmux.conf
bind -n M-h select-pane -L
bind -T copy-mode-vi v send -X begin-selection
",
        );

        let human = show(&settings_for(&env, false), ShowTarget::All, true)
            .unwrap()
            .to_human();
        assert!(human.contains("[normal+visual] <leader>y -> \"+y"));
        assert!(human.contains("  C-a r -> source-file ~/.tmux.conf"));
        assert!(human.contains("  M-h -> select-pane -L"));
        assert!(human.contains("  [copy-mode-vi] v -> send -X begin-selection"));
    }

    #[test]
    fn test_key_label() {
        assert_eq!(key_label(" "), "<Space>");
        assert_eq!(key_label("C-a"), "C-a");
    }
}
