//! CLI tests for `kvatrack config` and help output

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn kvatrack(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kvatrack").unwrap();
    cmd.env("HOME", home.path());
    cmd
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    kvatrack(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cutoff_hz = 5.0"))
        .stdout(predicate::str::contains("output_suffix = \"_Tracking\""));
}

#[test]
fn config_show_reads_user_file() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".config").join("kvatrack");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "[filter]\ncutoff_hz = 6.5\n").unwrap();

    kvatrack(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cutoff_hz = 6.5"));
}

#[test]
fn invalid_config_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("bad.toml");
    fs::write(&path, "[filter]\ncutoff_hz = -1.0\n").unwrap();

    kvatrack(&home)
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cutoff_hz must be a positive number"));
}

#[test]
fn config_path_points_into_home() {
    let home = TempDir::new().unwrap();
    kvatrack(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".config/kvatrack/config.toml"));
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    kvatrack(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("config"));
}
