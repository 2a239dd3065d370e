//! CLI tests for the `bct` binary.
//!
//! Spawns the binary against temp trees with real shell commands.

#![cfg(unix)]

use std::fs;
use std::process::Command;

use bct::exit_codes;
use bct::io::run_log::{ERROR_LOG_FILE, RUN_LOG_FILE};
use bct::test_support::write_tree;

#[test]
fn run_copies_tree_through_shell_command() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    let logs = temp.path().join("logs");
    write_tree(&input, &["a file.txt", "sub/b.txt"]).expect("tree");

    let status = Command::new(env!("CARGO_BIN_EXE_bct"))
        .current_dir(temp.path())
        .args(["run", "in", "out", "--command", "cp %i %o.bak", "--quiet"])
        .arg("--log-dir")
        .arg(&logs)
        .status()
        .expect("bct run");

    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(
        fs::read_to_string(output.join("a file.bak")).expect("a"),
        "a file.txt"
    );
    assert_eq!(
        fs::read_to_string(output.join("sub/b.bak")).expect("b"),
        "sub/b.txt"
    );

    let run_log = fs::read_to_string(logs.join(RUN_LOG_FILE)).expect("run log");
    assert!(run_log.contains("[INFO] Progress: 2/2 processed (0 excluded)"));
    assert!(run_log.contains("=== BCT Log Ended at "));
}

#[test]
fn failing_command_still_exits_ok_and_records_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    let logs = temp.path().join("logs");
    write_tree(&input, &["a.txt"]).expect("tree");

    let status = Command::new(env!("CARGO_BIN_EXE_bct"))
        .arg("run")
        .arg(&input)
        .arg(&output)
        .args(["--command", "exit 7", "--copy-on-error", "--quiet"])
        .arg("--log-dir")
        .arg(&logs)
        .status()
        .expect("bct run");

    assert_eq!(status.code(), Some(exit_codes::OK));
    assert!(output.join("a.txt").is_file());
    let errors = fs::read_to_string(logs.join(ERROR_LOG_FILE)).expect("error log");
    assert!(errors.contains("Command failed: exit 7"));
    assert!(errors.contains("Error code: 7"));
}

#[test]
fn missing_input_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_bct"))
        .current_dir(temp.path())
        .args(["run", "missing", "out", "--command", "true", "--quiet"])
        .arg("--log-dir")
        .arg(temp.path().join("logs"))
        .output()
        .expect("bct run");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn json_summary_is_printed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("in");
    write_tree(&input, &["a.txt", "b.md"]).expect("tree");

    let output = Command::new(env!("CARGO_BIN_EXE_bct"))
        .arg("run")
        .arg(&input)
        .arg(temp.path().join("out"))
        .args(["--command", "true", "--exclude", "md", "--quiet", "--json"])
        .arg("--log-dir")
        .arg(temp.path().join("logs"))
        .output()
        .expect("bct run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary json");
    assert_eq!(summary["total_files"], 2);
    assert_eq!(summary["processed_files"], 1);
    assert_eq!(summary["excluded_files"], 1);
    assert_eq!(summary["succeeded"], 1);
}

#[test]
fn tree_prints_indented_listing() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_tree(temp.path(), &["a.txt", "sub/b.txt"]).expect("tree");

    let output = Command::new(env!("CARGO_BIN_EXE_bct"))
        .arg("tree")
        .arg(temp.path())
        .output()
        .expect("bct tree");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "a.txt\n[sub]/\n  b.txt\n"
    );
}

#[test]
fn json_summary_keeps_stdout_clean_when_echo_is_on() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = temp.path().join("in");
    write_tree(&input, &["a.txt", "sub/b.txt"]).expect("tree");

    let output = Command::new(env!("CARGO_BIN_EXE_bct"))
        .arg("run")
        .arg(&input)
        .arg(temp.path().join("out"))
        .args(["--command", "true %i", "--json"])
        .arg("--log-dir")
        .arg(temp.path().join("logs"))
        .output()
        .expect("bct run");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is only the summary json");
    assert_eq!(summary["processed_files"], 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Progress: 2/2 processed"));
}
