//! Per-line parsers for tmux configuration directives.
//!
//! Each function looks at one trimmed physical line and returns what it
//! recognised, or `None`. They never fail: unrecognised text is skipped.

use super::describe::describe_command;
use crate::models::{PREFIX_TABLE, ROOT_TABLE, TmuxKeymap};
use regex::Regex;
use std::sync::LazyLock;

/// `set[-option] [flags] prefix KEY`, then the `prefix2` form.
static PREFIX_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:set-option|set)\s+(?:-[A-Za-z]+\s+)*prefix\s+(\S+)")
            .expect("Invalid prefix regex"),
        Regex::new(r"(?:set-option|set)\s+(?:-[A-Za-z]+\s+)*prefix2\s+(\S+)")
            .expect("Invalid prefix2 regex"),
    ]
});

const SET_VERBS: &[&str] = &["set", "set-option", "set-window-option", "setw"];

const BIND_VERBS: &[&str] = &["bind", "bind-key"];

/// Prefix key assigned on this line, if any.
///
/// `prefix` is tried before `prefix2`; the first pattern that matches wins.
/// A `None` value (tmux's "no key") is ignored.
pub fn parse_prefix(line: &str) -> Option<String> {
    let caps = PREFIX_PATTERNS.iter().find_map(|re| re.captures(line))?;
    let key = trim_quotes(&caps[1]);
    if key.is_empty() || key.eq_ignore_ascii_case("none") {
        return None;
    }
    Some(key.to_string())
}

/// Parse a `bind`/`bind-key` directive.
///
/// Flags before the key are consumed: `-T table` and legacy `-t table` set
/// the key table, `-n` selects the root table, `-N note` becomes the
/// description, and other flags (`-r`, ...) are dropped. The next word is
/// the key and the rest of the line is the command. Bindings without a
/// command are skipped.
pub fn parse_binding(line: &str) -> Option<TmuxKeymap> {
    let (verb, mut rest) = next_word(line)?;
    if !BIND_VERBS.contains(&verb) {
        return None;
    }

    let mut table = PREFIX_TABLE.to_string();
    let mut note: Option<String> = None;

    loop {
        let (word, after) = next_word(rest)?;
        if !is_flag(word) {
            break;
        }
        rest = after;

        let letters = &word[1..];
        for (i, letter) in letters.char_indices() {
            match letter {
                'T' | 't' | 'N' => {
                    let inline = &letters[i + letter.len_utf8()..];
                    let arg = if inline.is_empty() {
                        let (arg, after) = next_word(rest)?;
                        rest = after;
                        trim_quotes(arg).to_string()
                    } else {
                        inline.to_string()
                    };
                    if letter == 'N' {
                        note = Some(arg);
                    } else {
                        table = arg;
                    }
                    break;
                }
                'n' => table = ROOT_TABLE.to_string(),
                _ => {}
            }
        }
    }

    let (key, command) = next_word(rest)?;
    let command = command.trim();
    if command.is_empty() {
        return None;
    }

    let description = match note {
        Some(note) if !note.is_empty() => note,
        _ => describe_command(command),
    };

    Some(TmuxKeymap {
        key: trim_quotes(key).to_string(),
        command: command.to_string(),
        description,
        table,
    })
}

/// Parse a `set`/`set-option`/`set-window-option`/`setw` directive.
///
/// Leading flags are dropped (`-t` also drops its target). Accepts both
/// `name value` and a single `name=value` word. Surrounding quotes are
/// trimmed from the value.
pub fn parse_option(line: &str) -> Option<(String, String)> {
    let (verb, mut rest) = next_word(line)?;
    if !SET_VERBS.contains(&verb) {
        return None;
    }

    loop {
        let (word, after) = next_word(rest)?;
        if !is_flag(word) {
            break;
        }
        rest = after;
        if word.ends_with('t') {
            let (_, after) = next_word(rest)?;
            rest = after;
        }
    }

    let rest = rest.trim();
    match rest.split_once(char::is_whitespace) {
        Some((name, value)) => Some((name.to_string(), trim_quotes(value.trim()).to_string())),
        None => rest
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, value)| (name.to_string(), trim_quotes(value).to_string())),
    }
}

/// Split off the first word. Quoted words run to their closing quote.
///
/// Returns the raw word (quotes included) and the rest, left-trimmed.
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let first = s.chars().next()?;

    let end = if first == '"' || first == '\'' {
        s[1..]
            .find(first)
            .map(|i| i + 2)
            .unwrap_or(s.len())
    } else {
        s.find(char::is_whitespace).unwrap_or(s.len())
    };

    Some((&s[..end], s[end..].trim_start()))
}

/// A flag word: `-` followed by one or more ASCII letters.
fn is_flag(word: &str) -> bool {
    word.len() > 1
        && word.starts_with('-')
        && word[1..].chars().all(|c| c.is_ascii_alphabetic())
}

/// Strip one pair of matching surrounding quotes.
fn trim_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    match bytes {
        [open @ (b'"' | b'\''), .., close] if bytes.len() >= 2 && open == close => {
            &s[1..s.len() - 1]
        }
        _ => s,
    }
}
