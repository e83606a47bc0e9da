//! Integration tests for `cliq cache` subcommands.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cache_path_uses_cache_dir_env() {
    let env = TestEnv::new();
    env.cliq()
        .args(["cache", "path", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            env.cache_file().display().to_string(),
        ));
}

#[test]
fn test_cache_status_before_first_run() {
    let env = TestEnv::new();
    let output = env.cliq().args(["cache", "status"]).output().unwrap();
    assert!(output.status.success());

    let json = parse_json(&output.stdout);
    assert_eq!(json["exists"], false);
    assert_eq!(json["is_stale"], true);
    assert_eq!(json["enabled"], true);
    assert_eq!(json["ttl_hours"], 24);
}

#[test]
fn test_cache_status_after_show() {
    let env = TestEnv::with_fixtures();
    env.cliq().arg("show").assert().success();

    let output = env.cliq().args(["cache", "status"]).output().unwrap();
    let json = parse_json(&output.stdout);
    assert_eq!(json["exists"], true);
    assert_eq!(json["is_stale"], false);
    assert_eq!(json["nvim_leader"], " ");
    assert_eq!(json["nvim_keymaps_count"], 3);
    assert_eq!(json["tmux_prefix"], "C-a");
    assert_eq!(json["tmux_keymaps_count"], 2);
}

#[test]
fn test_cache_status_human() {
    let env = TestEnv::with_fixtures();
    env.cliq().arg("reload").assert().success();
    env.cliq()
        .args(["cache", "status", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stale (TTL 24h): no"))
        .stdout(predicate::str::contains("Neovim: leader <Space>, 3 keymaps, 0 plugins"))
        .stdout(predicate::str::contains("Tmux: prefix C-a, 2 keymaps"));
}

#[test]
fn test_cache_status_reports_corrupt_file() {
    let env = TestEnv::new();
    fs::write(env.cache_file(), "{ not json").unwrap();

    let output = env.cliq().args(["cache", "status"]).output().unwrap();
    assert!(output.status.success());
    let json = parse_json(&output.stdout);
    assert!(json["error"].as_str().unwrap().contains("corrupt"));
}

#[test]
fn test_show_recovers_from_corrupt_cache() {
    let env = TestEnv::with_fixtures();
    fs::write(env.cache_file(), "garbage").unwrap();

    let output = env.cliq().arg("show").output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout)["tmux"]["prefix"], "C-a");

    let cache: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.cache_file()).unwrap()).unwrap();
    assert_eq!(cache["tmux_config"]["prefix"], "C-a");
}

#[test]
fn test_cache_clear() {
    let env = TestEnv::with_fixtures();
    env.cliq().arg("reload").assert().success();
    assert!(env.cache_file().exists());

    let output = env.cliq().args(["cache", "clear"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout)["removed"], true);
    assert!(!env.cache_file().exists());

    env.cliq()
        .args(["cache", "clear", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cache at"));
}

#[test]
fn test_expired_cache_is_reparsed() {
    let env = TestEnv::with_fixtures();
    env.cliq().arg("show").assert().success();

    // Backdate the snapshot past the default TTL.
    let mut cache: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.cache_file()).unwrap()).unwrap();
    cache["last_parsed"] = serde_json::json!("2000-01-01T00:00:00Z");
    fs::write(env.cache_file(), cache.to_string()).unwrap();

    let output = env.cliq().arg("show").output().unwrap();
    assert_eq!(parse_json(&output.stdout)["from_cache"], false);
}
