//! E2E CLI tests. Each test runs the `rota` binary as a subprocess in an
//! isolated temp directory, against a canned local HTTP server where a
//! server is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

fn rota_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rota"));
    cmd.current_dir(dir);
    cmd.env("ROTA_LOG", "error");
    cmd.env_remove("ROTA_BASE_URL");
    cmd.env_remove("FORMAT");
    cmd
}

/// Serve one canned `(status, json body)` response per incoming connection,
/// then return the request lines that were received.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("length");
                    }
                }
            }
            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload).expect("body");
            seen.push(request_line.trim_end().to_string());

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("write response");
        }
        seen
    });
    (base_url, handle)
}

const SCHEDULE: &str = r#"{"id":1,"name":"Front desk","members":[{"id":10,"name":"Ann"},{"id":11,"name":"Bob"}],"shiftTypes":[{"id":5,"name":"Morning"}]}"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn help_lists_every_command() {
    let dir = TempDir::new().expect("temp dir");
    rota_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("shifts"))
        .stdout(predicate::str::contains("add-member"))
        .stdout(predicate::str::contains("edit"));
}

#[test]
fn malformed_date_is_a_usage_error() {
    let dir = TempDir::new().expect("temp dir");
    rota_cmd(dir.path())
        .args(["shifts", "1", "--from", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from"));
}

#[test]
fn unreachable_server_reports_transport_error_code() {
    let dir = TempDir::new().expect("temp dir");
    let output = rota_cmd(dir.path())
        .args(["show", "1", "--json", "--base-url", "http://127.0.0.1:1"])
        .output()
        .expect("run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: Value = serde_json::Deserializer::from_str(&stderr)
        .into_iter::<Value>()
        .next()
        .expect("error document")
        .expect("json error");
    assert_eq!(json["error"]["error_code"], "E4001");
}

#[test]
fn malformed_project_config_reports_config_code() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::create_dir_all(dir.path().join(".rota")).expect("create .rota");
    std::fs::write(dir.path().join(".rota/config.toml"), "[server\n").expect("write config");

    rota_cmd(dir.path())
        .args(["show", "1", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"))
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn show_prints_members_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let (base_url, server) = serve(vec![(200, SCHEDULE)]);

    let output = rota_cmd(dir.path())
        .args(["show", "1", "--json", "--base-url", &base_url])
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "show failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["name"], "Front desk");
    assert_eq!(json["members"][1]["name"], "Bob");
    assert_eq!(server.join().expect("server"), vec!["GET /api/schedules/1 HTTP/1.1"]);
}

#[test]
fn missing_schedule_exits_with_not_found_code() {
    let dir = TempDir::new().expect("temp dir");
    let (base_url, server) = serve(vec![(404, r#"{"message":"not found"}"#)]);

    rota_cmd(dir.path())
        .args(["show", "999", "--format", "text", "--base-url", &base_url])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2001]"));
    server.join().expect("server");
}

#[test]
fn shifts_text_output_lists_slots() {
    let dir = TempDir::new().expect("temp dir");
    let (base_url, server) = serve(vec![
        (200, SCHEDULE),
        (
            200,
            r#"[{"scheduleId":1,"shiftTypeId":5,"memberId":10,"date":"2024-01-01"}]"#,
        ),
    ]);

    rota_cmd(dir.path())
        .args([
            "shifts", "1", "--from", "2024-01-01", "--to", "2024-01-02", "--format", "text",
            "--base-url", &base_url,
        ])
        .assert()
        .success()
        .stdout("2024-01-01\t5\tAnn\n2024-01-02\t5\t\n");

    let seen = server.join().expect("server");
    assert_eq!(
        seen[1],
        "GET /api/schedules/1/shifts?dates%5B%5D=2024-01-01&dates%5B%5D=2024-01-02 HTTP/1.1"
    );
}

#[test]
fn edit_submits_the_changed_slot() {
    let dir = TempDir::new().expect("temp dir");
    let (base_url, server) = serve(vec![(200, SCHEDULE), (200, "[]"), (200, "{}")]);

    rota_cmd(dir.path())
        .args([
            "edit", "1", "--date", "2024-01-01", "--shift-type", "5", "--add", "11",
            "--format", "text", "--base-url", &base_url,
        ])
        .assert()
        .success()
        .stdout("2024-01-01#5\tsubmitted\tBob\n");

    let seen = server.join().expect("server");
    assert_eq!(seen[2], "PUT /api/schedules/1/shifts HTTP/1.1");
}
