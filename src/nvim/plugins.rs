//! Plugin declarations in plugin-manager spec files.

use crate::models::Plugin;
use regex::Regex;
use std::sync::LazyLock;

/// String literal shaped `owner/repo`.
static REPO_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z0-9_-]+/[A-Za-z0-9._-]+)"|'([A-Za-z0-9_-]+/[A-Za-z0-9._-]+)'"#)
        .expect("Invalid repo literal regex")
});

/// Marker that disables every plugin declared in the same file.
static DISABLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\benabled\s*=\s*false\b").expect("Invalid disable regex"));

/// Extract one plugin per `owner/repo` literal in a spec file.
///
/// The disable marker is scoped to the whole file: if it appears anywhere,
/// every plugin in the file is reported as disabled.
pub fn extract_plugins(text: &str) -> Vec<Plugin> {
    let enabled = !DISABLE_MARKER.is_match(text);
    REPO_LITERAL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter_map(|m| m.as_str().split_once('/'))
        .map(|(_, repo)| Plugin::new(repo, enabled))
        .collect()
}
