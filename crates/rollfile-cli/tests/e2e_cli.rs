//! E2E tests for piping stdin through `rollfile`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn rollfile_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rollfile"));
    cmd.current_dir(dir);
    cmd.env("ROLLFILE_LOG", "error");
    cmd
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

#[test]
fn stdin_lines_land_in_live_file() {
    let dir = TempDir::new().unwrap();

    rollfile_cmd(dir.path())
        .args(["--file", "app.log", "--layout", "message-pass-through"])
        .write_stdin("first\nsecond\n")
        .assert()
        .success();

    let content = read(&dir.path().join("app.log"));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["first", "second"]);
}

#[test]
fn basic_layout_stamps_level_and_category() {
    let dir = TempDir::new().unwrap();

    rollfile_cmd(dir.path())
        .args(["--file", "app.log", "--category", "ingest"])
        .write_stdin("hello\n")
        .assert()
        .success();

    let content = read(&dir.path().join("app.log"));
    assert!(content.starts_with('['), "unexpected line: {content}");
    assert!(content.contains("] [INFO] ingest - hello"), "unexpected line: {content}");
}

#[test]
fn size_budget_rotates_into_numbered_backups() {
    let dir = TempDir::new().unwrap();

    rollfile_cmd(dir.path())
        .args([
            "--file",
            "app.log",
            "--max-size",
            "6",
            "--backups",
            "2",
            "--layout",
            "message-pass-through",
        ])
        .write_stdin("aaaa\nbbbb\ncccc\ndddd\n")
        .assert()
        .success();

    assert_eq!(read(&dir.path().join("app.log")).trim_end(), "dddd");
    assert_eq!(read(&dir.path().join("app.log.1")).trim_end(), "cccc");
    assert_eq!(read(&dir.path().join("app.log.2")).trim_end(), "bbbb");
    assert!(!dir.path().join("app.log.3").exists());
}

#[test]
fn config_file_is_loaded_and_flags_override_it() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("appender.toml");
    fs::write(
        &config,
        "filename = \"from-config.log\"\nmax_log_size = 1024\n\n[layout]\ntype = \"message-pass-through\"\n",
    )
    .unwrap();

    rollfile_cmd(dir.path())
        .args(["--config", "appender.toml"])
        .write_stdin("configured\n")
        .assert()
        .success();
    assert_eq!(read(&dir.path().join("from-config.log")).trim_end(), "configured");

    rollfile_cmd(dir.path())
        .args(["--config", "appender.toml", "--file", "override.log"])
        .write_stdin("overridden\n")
        .assert()
        .success();
    assert_eq!(read(&dir.path().join("override.log")).trim_end(), "overridden");
}

#[test]
fn truncate_flag_keeps_previous_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    fs::write(&path, "earlier\n").unwrap();

    rollfile_cmd(dir.path())
        .args(["--file", "app.log", "--flags", "w", "--layout", "message-pass-through"])
        .write_stdin("later\n")
        .assert()
        .success();

    let content = read(&path);
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["earlier", "later"]);
}

#[test]
fn empty_file_name_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("appender.toml"), "filename = \"\"\n").unwrap();

    rollfile_cmd(dir.path())
        .args(["--config", "appender.toml"])
        .write_stdin("ignored\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("E1001"));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn unreadable_config_fails_with_its_path() {
    let dir = TempDir::new().unwrap();

    rollfile_cmd(dir.path())
        .args(["--config", "missing.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.toml"));
}

#[test]
fn io_failures_are_reported_but_do_not_fail_the_run() {
    let dir = TempDir::new().unwrap();

    rollfile_cmd(dir.path())
        .args(["--file", "no-such-dir/app.log", "--diagnostics", "stderr"])
        .write_stdin("lost\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("E5002"))
        .stderr(predicate::str::contains("E5003"));

    assert!(!dir.path().join("no-such-dir").exists());
}
