//! Lua-dialect scanners for `init.lua` and plugin spec files.
//!
//! Three independent passes run over the raw text:
//! - leader assignment (`vim.g.mapleader = " "` and the table-index form)
//! - call-style keymaps (`vim.keymap.set(mode, lhs, rhs, { desc = ... })`)
//! - legacy mapping commands inside `vim.cmd` bodies (`nnoremap lhs rhs`)
//!
//! Nothing here evaluates Lua. Lines whose first non-blank characters are
//! `--` are blanked before scanning so commented-out mappings are ignored.

use crate::models::Keymap;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

/// Placeholder rhs for keymaps bound to an inline Lua function.
pub const FUNCTION_RHS: &str = "<lua function>";

mod patterns {
    use super::*;

    /// Leader assignment forms, tried in order; first match wins.
    pub static LEADER: LazyLock<[Regex; 3]> = LazyLock::new(|| {
        [
            Regex::new(r#"vim\.g\.mapleader\s*=\s*["'](.+?)["']"#).expect("Invalid leader regex"),
            Regex::new(r#"vim\.g\[["']mapleader["']\]\s*=\s*["'](.+?)["']"#)
                .expect("Invalid indexed leader regex"),
            Regex::new(r#"\bg\.mapleader\s*=\s*["'](.+?)["']"#)
                .expect("Invalid short leader regex"),
        ]
    });

    /// `vim.keymap.set(mode, lhs, rhs, opts)`.
    pub static KEYMAP_SET: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#"(?x)
            vim\.keymap\.set\s*\(\s*
            (?: "([nvixsotc]+)" | '([nvixsotc]+)' | \{([^}]*)\} ) \s*,\s*
            (?: "([^"]+)" | '([^']+)' ) \s*,\s*
            (?: "([^"]*)" | '([^']*)' | (function)\b | ([^,\n]+) )
            \s*(?: ,\s*\{([^}]*)\} )?
            "#,
        )
        .expect("Invalid keymap.set regex")
    });

    /// `desc = "..."` inside an options table.
    pub static DESC: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"\bdesc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid desc regex")
    });

    /// Mode letters inside a mode table such as `{ "n", "v" }`.
    pub static MODE_ITEM: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"["']([nvixsotc])["']"#).expect("Invalid mode item regex")
    });

    /// Block keywords and string literals, for finding the `end` of an
    /// inline function. Strings are matched so keywords inside them are skipped.
    pub static BLOCK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|\[\[(?s:.*?)\]\]|\b(function|if|do|repeat|end|until)\b"#,
        )
        .expect("Invalid block token regex")
    });

    /// Options table following an inline function rhs.
    pub static TRAILING_OPTS: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*,\s*\{([^}]*)\}").expect("Invalid trailing options regex")
    });

    /// Body of a `vim.cmd` call: long string, or single/double quoted string.
    pub static CMD_CALL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"vim\.cmd\s*\(?\s*(?:\[\[((?s:.*?))\]\]|"([^"\n]*)"|'([^'\n]*)')"#)
            .expect("Invalid vim.cmd regex")
    });

    /// A `…remap lhs rhs` command line inside a `vim.cmd` body.
    pub static REMAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^([nvixsotc]?)n?o?remap\s+(?:<(?i:silent|buffer|expr|nowait|unique|script|special)>\s*)*(\S+)\s+(.+)$",
        )
        .expect("Invalid remap regex")
    });
}

/// Run every Lua pass over `init.lua` text.
pub fn scan_init(text: &str, source: &Path, leader: &mut String, keymaps: &mut Vec<Keymap>) {
    let text = strip_line_comments(text);
    if let Some(found) = extract_leader(&text) {
        *leader = found;
    }
    extract_keymap_set(&text, source, keymaps);
    extract_cmd_mappings(&text, source, keymaps);
}

/// Find the leader key assignment, if any.
pub fn extract_leader(text: &str) -> Option<String> {
    patterns::LEADER
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

/// Append keymaps from both call-style and `vim.cmd` declarations.
///
/// Call-style keymaps come first, in text order, then `vim.cmd` mappings.
pub fn extract_keymaps(text: &str, source: &Path, keymaps: &mut Vec<Keymap>) {
    let text = strip_line_comments(text);
    extract_keymap_set(&text, source, keymaps);
    extract_cmd_mappings(&text, source, keymaps);
}

fn extract_keymap_set(text: &str, source: &Path, keymaps: &mut Vec<Keymap>) {
    for caps in patterns::KEYMAP_SET.captures_iter(text) {
        let mode = match first_group(&caps, &[1, 2]) {
            Some(mode) => mode.to_string(),
            None => {
                let table = caps.get(3).map_or("", |m| m.as_str());
                let mode: String = patterns::MODE_ITEM
                    .captures_iter(table)
                    .map(|c| c[1].to_string())
                    .collect();
                if mode.is_empty() {
                    continue;
                }
                mode
            }
        };

        let Some(lhs) = first_group(&caps, &[4, 5]) else {
            continue;
        };

        let rhs = if let Some(s) = first_group(&caps, &[6, 7]) {
            s.to_string()
        } else if caps.get(8).is_some() {
            FUNCTION_RHS.to_string()
        } else {
            caps.get(9).map_or(String::new(), |m| trim_reference(m.as_str()))
        };

        // An inline function swallows the options table, so look past its `end`.
        let opts = match caps.get(8) {
            Some(func) => function_end(text, func.end())
                .and_then(|end| patterns::TRAILING_OPTS.captures(&text[end..]))
                .and_then(|c| c.get(1))
                .map(|m| m.as_str()),
            None => caps.get(10).map(|m| m.as_str()),
        };
        let description = opts.and_then(|opts| {
            patterns::DESC
                .captures(opts)
                .and_then(|d| first_group(&d, &[1, 2]).map(str::to_string))
        });

        keymaps.push(Keymap {
            mode,
            lhs: lhs.to_string(),
            rhs,
            description,
            source: source.to_path_buf(),
        });
    }
}

fn extract_cmd_mappings(text: &str, source: &Path, keymaps: &mut Vec<Keymap>) {
    for caps in patterns::CMD_CALL.captures_iter(text) {
        let Some(body) = first_group(&caps, &[1, 2, 3]) else {
            continue;
        };
        for line in body.lines() {
            let Some(m) = patterns::REMAP_LINE.captures(line.trim()) else {
                continue;
            };
            let mode = match &m[1] {
                "" => "n".to_string(),
                letter => letter.to_string(),
            };
            keymaps.push(Keymap {
                mode,
                lhs: m[2].to_string(),
                rhs: m[3].trim().to_string(),
                description: None,
                source: source.to_path_buf(),
            });
        }
    }
}

/// Byte offset just past the `end` closing a function whose `function`
/// keyword ends at `start`.
fn function_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for caps in patterns::BLOCK_TOKEN.captures_iter(&text[start..]) {
        let Some(keyword) = caps.get(1) else {
            continue;
        };
        match keyword.as_str() {
            "end" | "until" => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + keyword.end());
                }
            }
            _ => depth += 1,
        }
    }
    None
}

/// First participating group among `indices`.
fn first_group<'t>(caps: &Captures<'t>, indices: &[usize]) -> Option<&'t str> {
    indices
        .iter()
        .find_map(|&i| caps.get(i))
        .map(|m| m.as_str())
}

/// Trim a bare rhs expression and drop the closing parens of the call itself.
fn trim_reference(expr: &str) -> String {
    let mut expr = expr.trim();
    let balance = |s: &str| s.matches('(').count() as isize - s.matches(')').count() as isize;
    while balance(expr) < 0 {
        match expr.strip_suffix(')') {
            Some(rest) => expr = rest.trim_end(),
            None => break,
        }
    }
    expr.to_string()
}

/// Blank out Lua line comments while keeping line numbering intact.
fn strip_line_comments(text: &str) -> String {
    text.lines()
        .map(|line| if line.trim_start().starts_with("--") { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
