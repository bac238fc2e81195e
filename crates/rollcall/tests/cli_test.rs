//! Integration tests for the `rollcall` CLI binary.
//!
//! Parsing, help, completions and error handling run without a server.
//! Session flows run against a wiremock backend, with config and session
//! directories isolated under a temp dir per test.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `rollcall` binary with env isolation.
///
/// Clears all `ROLLCALL_*` env vars and points config and data
/// directories under `home` so tests never touch real configuration.
fn rollcall_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rollcall");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ROLLCALL_PROFILE")
        .env_remove("ROLLCALL_SERVER")
        .env_remove("ROLLCALL_OUTPUT")
        .env_remove("ROLLCALL_INSECURE")
        .env_remove("ROLLCALL_TIMEOUT")
        .env_remove("ROLLCALL_PASSWORD");
    cmd
}

fn offline_cmd() -> assert_cmd::Command {
    rollcall_cmd(Path::new("/tmp/rollcall-cli-test-nonexistent"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn teacher() -> serde_json::Value {
    json!({
        "id": 7,
        "email": "grace@school.test",
        "full_name": "Grace Hopper",
        "role": "teacher"
    })
}

fn student(id: i64, first: &str) -> serde_json::Value {
    json!({
        "id": id,
        "student_id": format!("S{id:03}"),
        "first_name": first,
        "last_name": "Pupil",
        "class_id": 4
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-1", "token_type": "bearer"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teacher()))
        .mount(server)
        .await;
}

/// Sign in through the binary, leaving a session file under `home`.
fn login(home: &Path, api: &str) {
    rollcall_cmd(home)
        .args(["--server", api, "login", "--email", "grace@school.test"])
        .env("ROLLCALL_PASSWORD", "s3cret")
        .assert()
        .success()
        .stderr(predicate::str::contains("Signed in as Grace Hopper"));
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = offline_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    offline_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("attendance")
            .and(predicate::str::contains("classes"))
            .and(predicate::str::contains("students")),
    );
}

#[test]
fn test_version_flag() {
    offline_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollcall"));
}

#[test]
fn test_completions_zsh() {
    offline_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    offline_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = offline_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_classes_without_config() {
    offline_cmd()
        .args(["classes", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_classes_without_session_fails_before_network() {
    let home = tempfile::tempdir().unwrap();
    // Nothing listens here; a request would fail with a connection error.
    rollcall_cmd(home.path())
        .args(["--server", "http://127.0.0.1:9/api/", "classes", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_invalid_output_format() {
    let output = offline_cmd()
        .args(["--output", "invalid", "classes", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_mark_rejects_unknown_status() {
    let output = offline_cmd()
        .args(["attendance", "mark", "--default-status", "tardy"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    offline_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_then_show_round_trip() {
    let home = tempfile::tempdir().unwrap();
    rollcall_cmd(home.path())
        .args(["config", "set", "default_status", "absent"])
        .assert()
        .success();
    rollcall_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_status = \"absent\""));
}

#[test]
fn test_config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    rollcall_cmd(home.path())
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

// ── Session flows ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_for_later_commands() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/classes"))
        .and(header("authorization", "bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "name": "Year 5 Maths", "student_count": 28}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args(["--server", &api, "--output", "plain", "classes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("4\n"));

    rollcall_cmd(home.path())
        .args(["--server", &api, "whoami", "--cached"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grace Hopper"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_detail_is_reported_verbatim() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/classes/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Class not found"})))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args(["--server", &api, "classes", "show", "99"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Class not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mark_sends_one_bulk_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            student(1, "Ada"),
            student(2, "Alan"),
            student(3, "Edsger")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/attendance/bulk"))
        .and(body_partial_json(json!({
            "class_id": 4,
            "date": "2024-09-02",
            "attendance_records": [
                {"student_id": 1, "status": "present"},
                {"student_id": 2, "status": "absent", "notes": "dentist"},
                {"student_id": 3, "status": "present"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Attendance marked for 3 students"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args([
            "--server",
            &api,
            "--yes",
            "attendance",
            "mark",
            "--class",
            "4",
            "--date",
            "2024-09-02",
            "--absent",
            "2",
            "--note",
            "2=dentist",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Attendance marked for 3 students"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mark_without_class_makes_no_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/attendance/bulk"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args(["--server", &api, "--yes", "attendance", "mark"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Please select a class first"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_clears_session_even_when_server_fails() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args(["--server", &api, "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out locally"));

    rollcall_cmd(home.path())
        .args(["--server", &api, "whoami", "--cached"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_corrupt_session_file_does_not_lock_out_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Successfully logged out"})))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let session = home.path().join("session.json");
    rollcall_cmd(home.path())
        .args(["config", "set", "session_file", session.to_str().unwrap()])
        .assert()
        .success();
    std::fs::write(&session, "{not json").unwrap();

    let api = format!("{}/api/", server.uri());
    rollcall_cmd(home.path())
        .args(["--server", &api, "logout"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Successfully logged out"));

    rollcall_cmd(home.path())
        .args(["--server", &api, "whoami", "--cached"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_reads_terms_from_stdin() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(wiremock::matchers::query_param("search", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([student(1, "Ada")])))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let api = format!("{}/api/", server.uri());
    login(home.path(), &api);

    rollcall_cmd(home.path())
        .args(["--server", &api, "--output", "plain", "students", "search"])
        .write_stdin("a\nad\nada\n")
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}
