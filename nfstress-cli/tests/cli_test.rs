//! Exit codes and output of the nfstress binary

use std::process::{Command, Output};

fn nfstress(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nfstress"))
        .args(args)
        .env("NFSTRESS_LOG_LEVEL", "warn")
        .env("NFSTRESS_PACE_MS", "0")
        .env("NFSTRESS_EXECUTOR", "http")
        .env("NFSTRESS_REQUEST_TIMEOUT", "2")
        .env("NFSTRESS_NRF_URL", "http://127.0.0.1:1")
        .output()
        .expect("failed to run nfstress")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_exits_zero() {
    let output = nfstress(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("auth-vectors"));
}

#[test]
fn test_zero_requests_is_rejected_with_usage() {
    let output = nfstress(&["discovery", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());

    let err = stderr(&output);
    assert!(err.contains("NUM_REQUESTS must be a positive integer"));
    assert!(err.contains("Usage:"));
}

#[test]
fn test_bad_arguments_exit_one() {
    let output = nfstress(&["register"]);
    assert_eq!(output.status.code(), Some(1));

    let output = nfstress(&["register", "5", "--concurrency", "0"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_failed_requests_still_exit_zero() {
    let output = nfstress(&["discovery", "3", "--sender", "oai-amf"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines[..3].iter().enumerate() {
        assert!(line.starts_with(&format!("[{}/3] FAIL", i + 1)), "{}", line);
        assert!(line.contains("status=000"));
    }
    assert!(lines[3].starts_with("SUMMARY total=3 ok=0 fail=3 skip=0"));
}

#[test]
fn test_json_output() {
    let output = nfstress(&["discovery", "2", "--output", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    let values: Vec<serde_json::Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0]["outcome"], "FAIL");
    assert_eq!(values[2]["summary"]["total"], 2);
}

#[test]
fn test_config_show() {
    let output = nfstress(&["config", "show", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["executor"]["backend"], "http");
    assert_eq!(value["endpoints"]["nrf"], "http://127.0.0.1:1");
}
