//! Line-oriented scanner for `init.vim`.

use crate::models::Keymap;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static LEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"let\s+(?:g:)?mapleader\s*=\s*["'](.+?)["']"#).expect("Invalid let leader regex")
});

/// `[mode][nore]map [<silent>...] lhs rhs` on a single line.
static MAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([nvixsotc]?)(?:nore)?map\s+(?:<(?i:silent|buffer|expr|nowait|unique|script|special)>\s*)*(\S+)\s+(.+)$",
    )
    .expect("Invalid map line regex")
});

/// Scan Vimscript text, updating the leader and appending keymaps.
///
/// Blank lines and `"` comment lines are skipped. Every leader assignment
/// overwrites the previous value, so the last one in the file wins.
pub fn scan_init(text: &str, source: &Path, leader: &mut String, keymaps: &mut Vec<Keymap>) {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('"') {
            continue;
        }

        if line.contains("mapleader")
            && let Some(caps) = LEADER.captures(line)
        {
            *leader = caps[1].to_string();
        }

        if let Some(keymap) = parse_map_line(line, source) {
            keymaps.push(keymap);
        }
    }
}

/// Parse one trimmed line as a mapping command.
pub fn parse_map_line(line: &str, source: &Path) -> Option<Keymap> {
    let caps = MAP_LINE.captures(line)?;
    let mode = match &caps[1] {
        "" => "n",
        letter => letter,
    };
    Some(Keymap {
        mode: mode.to_string(),
        lhs: caps[2].to_string(),
        rhs: caps[3].trim().to_string(),
        description: None,
        source: source.to_path_buf(),
    })
}
