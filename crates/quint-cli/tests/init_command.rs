// crates/quint-cli/tests/init_command.rs
// ============================================================================
// Module: CLI Init Command Tests
// Description: Integration tests for `quint init` project scaffolding.
// Purpose: Ensure init creates the expected directory tree and a usable store.
// Dependencies: quint-cli binary, tempfile
// ============================================================================

//! `quint init`/`quint serve` integration tests, run against the built binary.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;

fn quint_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_quint"))
}

#[test]
fn init_scaffolds_expected_layout() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let output = Command::new(quint_bin())
        .args(["init", "--path", dir.path().to_str().expect("utf8 path"), "--local"])
        .output()
        .expect("run quint init");
    assert!(output.status.success(), "init failed: {}", String::from_utf8_lossy(&output.stderr));

    let quint_dir = dir.path().join(".quint");
    for relative in ["knowledge/L0", "knowledge/L1", "knowledge/L2", "knowledge/invalid", "decisions", "sessions", "evidence"] {
        let path = quint_dir.join(relative);
        assert!(path.is_dir(), "expected directory to exist: {}", path.display());
    }
    assert!(quint_dir.join("quint.db").is_file(), "expected quint.db to be created");
}

#[test]
fn init_without_local_flag_still_succeeds() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let output = Command::new(quint_bin())
        .args(["init", "--path", dir.path().to_str().expect("utf8 path")])
        .output()
        .expect("run quint init");
    assert!(output.status.success());
    assert!(dir.path().join(".quint").join("quint.db").is_file());
}

#[test]
fn serve_without_init_fails_with_a_helpful_message() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let output = Command::new(quint_bin())
        .args(["serve", "--project", dir.path().to_str().expect("utf8 path")])
        .output()
        .expect("run quint serve");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("quint init"), "expected a hint to run init, got: {stderr}");
}

#[test]
fn serve_after_init_handles_one_initialize_request() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let init_output = Command::new(quint_bin())
        .args(["init", "--path", dir.path().to_str().expect("utf8 path"), "--local"])
        .output()
        .expect("run quint init");
    assert!(init_output.status.success());

    let mut child = Command::new(quint_bin())
        .args(["serve", "--project", dir.path().to_str().expect("utf8 path")])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn quint serve");

    {
        let stdin = child.stdin.as_mut().expect("child stdin");
        writeln!(stdin, r#"{{"jsonrpc":"2.0","id":1,"method":"initialize"}}"#).expect("write request");
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("wait for quint serve to exit");
    assert!(output.status.success(), "serve exited non-zero: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"protocolVersion\""));
    assert!(stdout.contains("\"quint\""));
}
