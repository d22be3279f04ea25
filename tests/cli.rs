use assert_cmd::Command;

#[test]
fn help_prints_usage() {
    Command::cargo_bin("serve")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn invalid_tick_rate_exits_with_config_error() {
    Command::cargo_bin("serve")
        .unwrap()
        .args(["--tick-hz", "0"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_config_file_exits_with_config_error() {
    Command::cargo_bin("serve")
        .unwrap()
        .args(["--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unknown_flags_exit_with_usage_error() {
    Command::cargo_bin("serve")
        .unwrap()
        .arg("--warp-speed")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn journal_stats_reports_missing_directories() {
    Command::cargo_bin("journal-stats")
        .unwrap()
        .args(["--dir", "no-such-journal-dir"])
        .assert()
        .failure()
        .code(1);
}
