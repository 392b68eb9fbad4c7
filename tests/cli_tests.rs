//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn audio_control_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_audio-control"));
    cmd.env_remove("AUDIO_CONTROL_URL")
        .env_remove("AUDIO_CONTROL_BIND")
        .env_remove("RUST_LOG");
    cmd
}

/// Command with its config directory pointed at `dir`
fn with_config_home(dir: &TempDir) -> Command {
    let mut cmd = audio_control_bin();
    cmd.env("XDG_CONFIG_HOME", dir.path()).env("HOME", dir.path());
    cmd
}

#[test]
fn help_output() {
    audio_control_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("volume"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("pair"))
        .stdout(predicate::str::contains("reconnect"))
        .stdout(predicate::str::contains("--url"));
}

#[test]
fn version_output() {
    audio_control_bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("audio-control"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn serve_help() {
    audio_control_bin()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--scan-duration"))
        .stdout(predicate::str::contains("--discovery-mode"));
}

#[test]
fn config_help() {
    audio_control_bin()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_path_command() {
    let dir = TempDir::new().unwrap();
    with_config_home(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("audio-control"))
        .stdout(predicate::str::contains("config.toml"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_set_then_get() {
    let dir = TempDir::new().unwrap();

    with_config_home(&dir)
        .args(["config", "set", "discovery_mode", "snapshot"])
        .assert()
        .success();

    with_config_home(&dir)
        .args(["config", "get", "discovery_mode"])
        .assert()
        .success()
        .stdout(predicate::str::diff("snapshot\n"));

    with_config_home(&dir)
        .args(["config", "get", "bind"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_init_then_list() {
    let dir = TempDir::new().unwrap();

    with_config_home(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Config file created"));

    with_config_home(&dir)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:8080"))
        .stdout(predicate::str::contains("streaming"))
        .stdout(predicate::str::contains("bluetoothctl"));

    with_config_home(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
