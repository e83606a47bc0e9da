//! Snapshot cache for extracted configuration.
//!
//! The cache is one JSON file holding the last extracted [`NvimConfig`] and
//! [`TmuxConfig`] plus the time they were extracted. It is replaced wholesale
//! on every save and never merged.
//!
//! Two independent staleness queries are offered:
//! - [`CacheManager::is_stale`] - age of the snapshot against a TTL
//! - [`CacheManager::needs_refresh`] - source files modified after the snapshot
//!
//! Callers decide which to consult; the query flow in `commands` uses only
//! the TTL.

use crate::models::{NvimConfig, TmuxConfig};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// File name of the cache inside the cache directory.
pub const CACHE_FILE_NAME: &str = "config-cache.json";

/// TTL used by [`CacheManager::summary`].
pub const SUMMARY_TTL_HOURS: u32 = 24;

/// Persisted snapshot of extracted configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cache {
    /// Extracted Neovim config, absent if never extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvim_config: Option<NvimConfig>,

    /// Extracted tmux config, absent if never extracted or unreadable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmux_config: Option<TmuxConfig>,

    /// When the snapshot was last saved; `None` means never
    #[serde(default)]
    pub last_parsed: Option<DateTime<Utc>>,

    /// SHA-256 of each source file, keyed by path. Informational only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config_hashes: BTreeMap<String, String>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Cache {
    /// Create a snapshot from freshly extracted configs.
    pub fn new(nvim_config: Option<NvimConfig>, tmux_config: Option<TmuxConfig>) -> Self {
        Self {
            nvim_config,
            tmux_config,
            ..Default::default()
        }
    }

    /// Whether the snapshot holds no extracted data.
    pub fn is_empty(&self) -> bool {
        self.nvim_config.is_none() && self.tmux_config.is_none()
    }

    /// Record the SHA-256 of every source file that exists.
    ///
    /// Covers `init.lua` and `init.vim` in the Neovim directory and the tmux
    /// config file. Files that cannot be read are left out.
    pub fn record_source_hashes(&mut self) {
        self.config_hashes.clear();
        for path in self.source_files() {
            if let Ok(bytes) = fs::read(&path) {
                let digest = Sha256::digest(&bytes);
                self.config_hashes
                    .insert(path.display().to_string(), format!("{:x}", digest));
            }
        }
    }

    /// Paths whose modification invalidates the snapshot.
    fn source_files(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(nvim) = &self.nvim_config {
            paths.push(nvim.config_path.join("init.lua"));
            paths.push(nvim.config_path.join("init.vim"));
        }
        if let Some(tmux) = &self.tmux_config {
            paths.push(tmux.config_path.clone());
        }
        paths
    }
}

/// Counts and flags describing the cached snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    pub path: PathBuf,
    pub exists: bool,
    pub last_parsed: Option<DateTime<Utc>>,
    pub is_stale_24h: bool,
    pub needs_refresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim_leader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim_keymaps_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvim_plugins_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmux_keymaps_count: Option<usize>,
}

/// Owns the cache file and the in-memory snapshot.
#[derive(Debug)]
pub struct CacheManager {
    path: PathBuf,
    snapshot: Cache,
}

impl CacheManager {
    /// Create a manager for the cache file at `path` with an empty snapshot.
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Cache::default(),
        }
    }

    /// Cache file path inside a cache directory.
    pub fn default_path(cache_dir: &Path) -> PathBuf {
        cache_dir.join(CACHE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory snapshot.
    pub fn snapshot(&self) -> &Cache {
        &self.snapshot
    }

    /// Load the snapshot from disk.
    ///
    /// A missing file yields an empty snapshot. A file that exists but does
    /// not deserialize is [`Error::CacheCorrupt`].
    pub fn load(&mut self) -> Result<&Cache> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No cache file");
                self.snapshot = Cache::default();
                return Ok(&self.snapshot);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        self.snapshot = serde_json::from_str(&data).map_err(|source| Error::CacheCorrupt {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Loaded cache");
        Ok(&self.snapshot)
    }

    /// Replace the snapshot and persist it.
    ///
    /// `last_parsed` is stamped with the current time. The in-memory snapshot
    /// is replaced before writing, so it stays usable if the write fails.
    pub fn save(&mut self, mut snapshot: Cache) -> Result<()> {
        snapshot.last_parsed = Some(Utc::now());
        self.snapshot = snapshot;
        self.persist().map_err(|source| Error::CacheWrite {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Saved cache");
        Ok(())
    }

    /// Write the snapshot through a temp file in the same directory.
    fn persist(&self) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(&self.snapshot)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Whether the snapshot is older than `ttl_hours`, or was never saved.
    pub fn is_stale(&self, ttl_hours: u32) -> bool {
        match self.snapshot.last_parsed {
            None => true,
            Some(parsed) => Utc::now() - parsed > Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Whether a source file changed after the snapshot was saved.
    ///
    /// Checks the tmux config file, the Neovim directory and its
    /// `init.lua`/`init.vim`. Paths that cannot be stat'ed count as unchanged.
    pub fn needs_refresh(&self) -> bool {
        let since = self
            .snapshot
            .last_parsed
            .map(SystemTime::from)
            .unwrap_or(UNIX_EPOCH);

        let mut paths = self.snapshot.source_files();
        if let Some(nvim) = &self.snapshot.nvim_config {
            paths.push(nvim.config_path.clone());
        }

        paths.iter().any(|path| modified_since(path, since))
    }

    /// Reset the snapshot and delete the cache file.
    ///
    /// A file that is already gone is not an error.
    pub fn clear(&mut self) -> Result<()> {
        self.snapshot = Cache::default();
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed cache file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Summarize the current snapshot.
    pub fn summary(&self) -> CacheSummary {
        let nvim = self.snapshot.nvim_config.as_ref();
        let tmux = self.snapshot.tmux_config.as_ref();
        CacheSummary {
            path: self.path.clone(),
            exists: self.path.is_file(),
            last_parsed: self.snapshot.last_parsed,
            is_stale_24h: self.is_stale(SUMMARY_TTL_HOURS),
            needs_refresh: self.needs_refresh(),
            nvim_leader: nvim.map(|n| n.leader.clone()),
            nvim_keymaps_count: nvim.map(|n| n.keymaps.len()),
            nvim_plugins_count: nvim.map(|n| n.plugins.len()),
            tmux_prefix: tmux.map(|t| t.prefix.clone()),
            tmux_keymaps_count: tmux.map(|t| t.keymaps.len()),
        }
    }
}

fn modified_since(path: &Path, since: SystemTime) -> bool {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => mtime > since,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Cannot stat config source");
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Keymap, Plugin, TmuxKeymap};
    use crate::test_utils::TestEnv;

    fn sample_snapshot(env: &TestEnv) -> Cache {
        let mut nvim = NvimConfig::new(env.nvim_dir());
        nvim.leader = " ".to_string();
        nvim.keymaps.push(Keymap {
            mode: "n".to_string(),
            lhs: "<leader>w".to_string(),
            rhs: ":w<CR>".to_string(),
            description: Some("Save file".to_string()),
            source: env.nvim_dir().join("init.lua"),
        });
        nvim.plugins.push(Plugin::new("telescope.nvim", true));

        let mut tmux = TmuxConfig::new(env.tmux_conf());
        tmux.prefix = "C-a".to_string();
        tmux.keymaps.push(TmuxKeymap {
            key: "|".to_string(),
            command: "split-window -h".to_string(),
            description: "Split pane horizontally".to_string(),
            table: "prefix".to_string(),
        });
        tmux.options.insert("mouse".to_string(), "on".to_string());

        Cache::new(Some(nvim), Some(tmux))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());
        let snapshot = cache.load().unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.last_parsed.is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let env = TestEnv::new();
        let snapshot = sample_snapshot(&env);
        let before = Utc::now();

        let mut cache = CacheManager::new(env.cache_file());
        cache.save(snapshot.clone()).unwrap();

        let mut reloaded = CacheManager::new(env.cache_file());
        let loaded = reloaded.load().unwrap().clone();
        assert_eq!(loaded.nvim_config, snapshot.nvim_config);
        assert_eq!(loaded.tmux_config, snapshot.tmux_config);
        assert!(loaded.last_parsed.unwrap() >= before);
        assert_eq!(&loaded, cache.snapshot());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let env = TestEnv::new();
        let path = env.cache_dir.path().join("nested/dir/config-cache.json");
        let mut cache = CacheManager::new(&path);
        cache.save(Cache::default()).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_json_uses_snake_case_fields() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());
        cache.save(sample_snapshot(&env)).unwrap();

        let raw = fs::read_to_string(env.cache_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("nvim_config").is_some());
        assert!(value["nvim_config"].get("config_path").is_some());
        assert!(value["tmux_config"]["keymaps"][0].get("table").is_some());
        assert!(value["last_parsed"].is_string());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_save_failure_keeps_snapshot_in_memory() {
        let env = TestEnv::new();
        // A regular file where the parent directory should be.
        let blocker = env.cache_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut cache = CacheManager::new(blocker.join("config-cache.json"));

        let err = cache.save(sample_snapshot(&env)).unwrap_err();
        assert!(matches!(err, Error::CacheWrite { .. }));
        assert!(!cache.snapshot().is_empty());
        assert!(cache.snapshot().last_parsed.is_some());
    }

    #[test]
    fn test_corrupt_file() {
        let env = TestEnv::new();
        fs::write(env.cache_file(), "{ not json").unwrap();
        let mut cache = CacheManager::new(env.cache_file());
        let err = cache.load().unwrap_err();
        assert!(matches!(err, Error::CacheCorrupt { .. }));
    }

    #[test]
    fn test_stale_when_never_parsed() {
        let env = TestEnv::new();
        let cache = CacheManager::new(env.cache_file());
        assert!(cache.is_stale(24));
    }

    #[test]
    fn test_ttl_staleness() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());

        cache.snapshot.last_parsed = Some(Utc::now() - Duration::hours(25));
        assert!(cache.is_stale(24));

        cache.snapshot.last_parsed = Some(Utc::now() - Duration::hours(1));
        assert!(!cache.is_stale(24));
    }

    #[test]
    fn test_needs_refresh_tracks_source_mtime() {
        let env = TestEnv::new();
        env.write_nvim("init.lua", "vim.g.mapleader = ' '\n");
        env.write_tmux("set -g prefix C-a\n");

        let mut cache = CacheManager::new(env.cache_file());
        cache.snapshot = sample_snapshot(&env);

        cache.snapshot.last_parsed = Some(Utc::now() - Duration::hours(1));
        assert!(cache.needs_refresh());

        cache.snapshot.last_parsed = Some(Utc::now() + Duration::hours(1));
        assert!(!cache.needs_refresh());
    }

    #[test]
    fn test_needs_refresh_ignores_missing_sources() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());
        cache.snapshot = sample_snapshot(&env);
        cache.snapshot.last_parsed = Some(Utc::now() - Duration::hours(1));
        assert!(!cache.needs_refresh());
    }

    #[test]
    fn test_clear_removes_file_and_resets() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());
        cache.save(sample_snapshot(&env)).unwrap();
        assert!(env.cache_file().exists());

        cache.clear().unwrap();
        assert!(!env.cache_file().exists());
        assert!(cache.snapshot().is_empty());
        assert!(cache.snapshot().last_parsed.is_none());

        // Clearing twice is fine.
        cache.clear().unwrap();
    }

    #[test]
    fn test_record_source_hashes() {
        let env = TestEnv::new();
        let init = env.write_nvim("init.lua", "print('hi')\n");
        let mut snapshot = sample_snapshot(&env);
        snapshot.record_source_hashes();

        assert_eq!(snapshot.config_hashes.len(), 1);
        let hash = &snapshot.config_hashes[&init.display().to_string()];
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_summary_counts() {
        let env = TestEnv::new();
        let mut cache = CacheManager::new(env.cache_file());
        cache.save(sample_snapshot(&env)).unwrap();

        let summary = cache.summary();
        assert!(summary.exists);
        assert!(!summary.is_stale_24h);
        assert_eq!(summary.nvim_leader.as_deref(), Some(" "));
        assert_eq!(summary.nvim_keymaps_count, Some(1));
        assert_eq!(summary.nvim_plugins_count, Some(1));
        assert_eq!(summary.tmux_prefix.as_deref(), Some("C-a"));
        assert_eq!(summary.tmux_keymaps_count, Some(1));
    }
}
