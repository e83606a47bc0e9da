//! Human descriptions for tmux commands.

/// Known command prefixes, lowercased. Longest matching prefix wins.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("split-window -h", "Split pane horizontally"),
    ("split-window -v", "Split pane vertically"),
    ("split-window", "Split pane"),
    ("splitw -h", "Split pane horizontally"),
    ("splitw -v", "Split pane vertically"),
    ("new-window", "Create new window"),
    ("kill-pane", "Close current pane"),
    ("kill-window", "Close current window"),
    ("kill-session", "Close current session"),
    ("select-pane -l", "Select pane to the left"),
    ("select-pane -r", "Select pane to the right"),
    ("select-pane -u", "Select pane above"),
    ("select-pane -d", "Select pane below"),
    ("select-window", "Select window"),
    ("resize-pane -z", "Toggle pane zoom"),
    ("resize-pane", "Resize pane"),
    ("next-window", "Go to next window"),
    ("previous-window", "Go to previous window"),
    ("last-window", "Go to last window"),
    ("last-pane", "Go to last pane"),
    ("copy-mode", "Enter copy mode"),
    ("paste-buffer", "Paste from buffer"),
    ("source-file", "Reload config"),
    ("command-prompt", "Open command prompt"),
    ("display-message", "Display message"),
    ("display-popup", "Open popup"),
    ("clock-mode", "Show clock"),
    ("choose-tree", "Choose session/window"),
    ("choose-session", "Choose session"),
    ("choose-window", "Choose window"),
    ("detach-client", "Detach from session"),
    ("rename-window", "Rename current window"),
    ("rename-session", "Rename current session"),
    ("swap-pane", "Swap panes"),
    ("swap-window", "Swap windows"),
    ("rotate-window", "Rotate panes"),
    ("break-pane", "Break pane into window"),
    ("join-pane", "Join pane to window"),
    ("send-keys -x", "Copy mode action"),
    ("send-keys", "Send keys to pane"),
    ("send-prefix", "Send prefix key"),
    ("set-option", "Set option"),
    ("show-options", "Show options"),
    ("list-keys", "List key bindings"),
    ("list-sessions", "List sessions"),
    ("list-windows", "List windows"),
    ("list-panes", "List panes"),
];

/// Derive a description for a bound command.
///
/// Tries the static table by longest prefix of the lowercased command, then a
/// few keyword heuristics. Returns an empty string when nothing applies.
pub fn describe_command(command: &str) -> String {
    let cmd = command.trim().to_lowercase();

    let best = DESCRIPTIONS
        .iter()
        .filter(|(prefix, _)| cmd.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len());
    if let Some((_, desc)) = best {
        return desc.to_string();
    }

    let heuristic = if cmd.contains("split") {
        "Split pane"
    } else if cmd.contains("select-pane") {
        "Select pane"
    } else if cmd.contains("resize") {
        "Resize pane"
    } else if cmd.contains("window") {
        "Window operation"
    } else if cmd.contains("pane") {
        "Pane operation"
    } else {
        ""
    };
    heuristic.to_string()
}
