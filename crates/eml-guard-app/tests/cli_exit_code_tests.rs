//! Integration tests for the `eml-guard` binary: exit codes and output shapes.

use std::path::Path;
use std::process::{Command, Output};
use std::thread;

const SAFE_BODY: &str = r#"{
    "verdict":{"is_phishing":false,"risk_level":"low","recommendation":"no action needed"},
    "email_data":{"sender":"cfo@example.test","subject":"Quarterly report","links_count":2}
}"#;

const EXIT_ERROR_VIEW: i32 = 1;
const EXIT_NOT_SUBMITTED: i32 = 2;
const EXIT_NOTHING_PENDING: i32 = 3;

/// Binary invocation isolated from the caller's environment.
fn eml_guard(store_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_eml-guard"));
    for key in [
        "EML_GUARD_ENDPOINT",
        "EML_GUARD_STORE_DIR",
        "EML_GUARD_SESSION",
        "EML_GUARD_HTTP_TIMEOUT_SECS",
        "EML_GUARD_LOG",
    ] {
        command.env_remove(key);
    }
    command.arg("--store-dir").arg(store_dir);
    command
}

fn run(command: &mut Command) -> Output {
    command.output().expect("binary should run")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Answers one analysis request with `status`/`body`.
fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("server should bind");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("server should listen on ip");
    let endpoint = format!("http://{addr}/analyze-eml");

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request should arrive");
        let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
            .expect("header should build");
        request
            .respond(
                tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header),
            )
            .expect("response should be sent");
    });

    (endpoint, handle)
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("fixture should be written");
    path
}

#[test]
fn cli_exit_code_tests_verdict_exits_zero() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let file = write_file(dir.path(), "report.eml", b"Subject: hi\r\n\r\nbody");
    let (endpoint, server) = serve_once(200, SAFE_BODY);

    let output = run(eml_guard(&dir.path().join("store"))
        .args(["--endpoint", endpoint.as_str(), "analyze"])
        .arg(&file));
    server.join().expect("server thread should finish");

    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("[SAFE] File looks safe"), "{stdout}");
    assert!(stdout.contains("Sender: cfo@example.test"), "{stdout}");
}

#[test]
fn cli_exit_code_tests_service_error_exits_one() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let file = write_file(dir.path(), "report.eml", b"Subject: hi\r\n\r\nbody");
    let (endpoint, server) = serve_once(422, r#"{"detail":"unsupported encoding"}"#);

    let output = run(eml_guard(&dir.path().join("store"))
        .args(["--endpoint", endpoint.as_str(), "--format", "json", "analyze"])
        .arg(&file));
    server.join().expect("server thread should finish");

    assert_eq!(output.status.code(), Some(EXIT_ERROR_VIEW));
    let body: serde_json::Value =
        serde_json::from_str(stdout_of(&output).trim()).expect("stdout should be json");
    assert_eq!(body["outcome"], "service_error");
    assert_eq!(body["message"], "unsupported encoding");
}

#[test]
fn cli_exit_code_tests_rejection_exits_two_without_request() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let file = write_file(dir.path(), "invoice.pdf", b"%PDF-1.7");

    let output = run(eml_guard(&dir.path().join("store"))
        .args(["--endpoint", "http://127.0.0.1:9/analyze-eml", "--format", "json", "analyze"])
        .arg(&file));

    assert_eq!(output.status.code(), Some(EXIT_NOT_SUBMITTED));
    let body: serde_json::Value =
        serde_json::from_str(stdout_of(&output).trim()).expect("stdout should be json");
    assert_eq!(body["outcome"], "rejected");
    assert_eq!(body["message"], "unsupported extension");
}

#[test]
fn cli_exit_code_tests_missing_file_exits_two_with_form_notice() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = dir.path().join("store");

    let output = run(eml_guard(&store).arg("upload").arg(dir.path().join("nope.eml")));

    assert_eq!(output.status.code(), Some(EXIT_NOT_SUBMITTED));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Error processing file. Try again."), "{stdout}");
    assert!(stdout.contains("nope.eml"), "{stdout}");
    assert!(!store.join("default").join("fileToAnalyze.json").exists());
}

#[test]
fn cli_exit_code_tests_nothing_pending_exits_three() {
    let dir = tempfile::tempdir().expect("temp dir should be created");

    let output = run(eml_guard(&dir.path().join("store")).args(["--format", "json", "result"]));

    assert_eq!(output.status.code(), Some(EXIT_NOTHING_PENDING));
    let body: serde_json::Value =
        serde_json::from_str(stdout_of(&output).trim()).expect("stdout should be json");
    assert_eq!(body["navigate"], "index.html");
}

#[test]
fn cli_exit_code_tests_upload_then_result_across_invocations() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = dir.path().join("store");
    let file = write_file(dir.path(), "report.eml", b"Subject: hi\r\n\r\nbody");

    let uploaded = run(eml_guard(&store)
        .args(["--format", "json", "--session", "tab-1", "upload"])
        .arg(&file));
    assert_eq!(uploaded.status.code(), Some(0));
    let body: serde_json::Value =
        serde_json::from_str(stdout_of(&uploaded).trim()).expect("stdout should be json");
    assert_eq!(body["navigate"], "result.html");
    assert_eq!(body["session"], "tab-1");
    assert!(store.join("tab-1").join("fileToAnalyze.json").exists());

    let (endpoint, server) = serve_once(200, SAFE_BODY);
    let analyzed = run(eml_guard(&store).args([
        "--endpoint",
        endpoint.as_str(),
        "--session",
        "tab-1",
        "--format",
        "json",
        "result",
    ]));
    server.join().expect("server thread should finish");
    assert_eq!(analyzed.status.code(), Some(0));
    let body: serde_json::Value =
        serde_json::from_str(stdout_of(&analyzed).trim()).expect("stdout should be json");
    assert_eq!(body["outcome"], "success");
    assert_eq!(body["result"]["email_data"]["sender"], "cfo@example.test");

    // The record was consumed by the first result page.
    let again = run(eml_guard(&store).args(["--session", "tab-1", "result"]));
    assert_eq!(again.status.code(), Some(EXIT_NOTHING_PENDING));
}

#[test]
fn cli_exit_code_tests_piped_logs_carry_no_color_codes() {
    let dir = tempfile::tempdir().expect("temp dir should be created");

    let output = run(eml_guard(&dir.path().join("store")).args(["-vv", "result"]));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty(), "debug logs should be written");
    assert!(!stderr.contains('\u{1b}'), "{stderr:?}");
}
