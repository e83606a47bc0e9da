//! Stamps `cliq version` output with build metadata.
//!
//! - `CLIQ_BUILD_TIMESTAMP`: UTC build time, RFC 3339
//! - `CLIQ_GIT_COMMIT`: short HEAD hash with a `-dirty` suffix for uncommitted
//!   changes, or "unknown" outside a git checkout

use std::process::Command;

fn main() {
    for watched in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", watched);
    }

    let built = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    println!("cargo:rustc-env=CLIQ_BUILD_TIMESTAMP={}", built);
    println!("cargo:rustc-env=CLIQ_GIT_COMMIT={}", commit_label());
}

fn commit_label() -> String {
    let Some(hash) = git(&["rev-parse", "--short", "HEAD"]) else {
        return "unknown".to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

/// Run git and return trimmed stdout, or `None` on any failure.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
