//! CLI integration tests for the `slamy` binary.
//!
//! These tests run the compiled binary via `std::process::Command`. Each
//! test spawns a fresh process with `SLAMY_CONFIG` pointing at a
//! nonexistent path and the token variables removed, so no real
//! credentials are picked up and no request reaches Slack.

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Build a `Command` pointing at the compiled `slamy` binary.
fn slamy_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_slamy"));
    cmd.env("SLAMY_CONFIG", "/tmp/.slamy-test-nonexistent-config.json");
    cmd.env_remove("SLACK_BOT_TOKEN");
    cmd.env_remove("SLACK_USER_TOKEN");
    cmd.env_remove("SLACK_APP_TOKEN");
    // Keep stderr free of tracing output.
    cmd.env("RUST_LOG", "off");
    cmd
}

fn run(args: &[&str]) -> Output {
    slamy_bin().args(args).output().expect("failed to run slamy")
}

// ── 1. Version and help ─────────────────────────────────────────────────

#[test]
fn version_output() {
    let output = run(&["--version"]);
    assert!(output.status.success(), "exit code should be 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slamy"), "got: {stdout}");
}

#[test]
fn help_lists_command_groups() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for group in ["messages", "channels", "users", "search", "events"] {
        assert!(stdout.contains(group), "help should mention {group}, got: {stdout}");
    }
}

#[test]
fn unknown_subcommand_fails() {
    let output = run(&["this-subcommand-does-not-exist"]);
    assert!(!output.status.success());
}

// ── 2. Credential errors ────────────────────────────────────────────────

#[test]
fn missing_tokens_is_reported() {
    let output = run(&["auth", "test"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SLACK_BOT_TOKEN") && stderr.contains("either a bot token or a user token"),
        "got: {stderr}"
    );
}

#[test]
fn events_without_app_token_is_reported() {
    let output = slamy_bin()
        .env("SLACK_BOT_TOKEN", "xoxb-test")
        .args(["events", "listen"])
        .output()
        .expect("failed to run slamy");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("app-level token"), "got: {stderr}");
    assert!(!stderr.contains("xoxb-test"), "token leaked: {stderr}");
}

#[test]
fn missing_config_override_is_reported() {
    let output = run(&["--config", "/tmp/.slamy-definitely-missing.json", "auth", "test"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "got: {stderr}");
}

#[test]
fn malformed_config_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    let output = run(&["--config", file.path().to_str().unwrap(), "auth", "test"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse config file"), "got: {stderr}");
}

// ── 3. Local validation ─────────────────────────────────────────────────

#[test]
fn empty_message_text_is_rejected() {
    let output = slamy_bin()
        .env("SLACK_BOT_TOKEN", "xoxb-test")
        .args(["messages", "post", "C1", "--text", "   "])
        .output()
        .expect("failed to run slamy");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("message text is empty"), "got: {stderr}");
}

#[test]
fn oversized_update_is_rejected_before_network() {
    let text = "x".repeat(4001);
    let output = slamy_bin()
        .env("SLACK_BOT_TOKEN", "xoxb-test")
        .args(["messages", "update", "C1", "1.0", "--text", &text])
        .output()
        .expect("failed to run slamy");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("auto-splitting"), "got: {stderr}");
}

#[test]
fn upload_of_missing_file_is_rejected() {
    let output = slamy_bin()
        .env("SLACK_BOT_TOKEN", "xoxb-test")
        .args(["files", "upload", "C1", "/tmp/.slamy-no-such-upload.bin"])
        .output()
        .expect("failed to run slamy");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read upload source"), "got: {stderr}");
}

#[test]
fn json_and_plain_together_fail() {
    let output = run(&["--json", "--plain", "auth", "test"]);
    assert!(!output.status.success());
}

// ── 4. MCP server ───────────────────────────────────────────────────────

#[test]
fn mcp_serves_tools_without_tokens() {
    let mut child = slamy_bin()
        .arg("mcp")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn slamy mcp");

    let requests = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"slack_get_users","arguments":{}}}"#,
    ];
    {
        let mut stdin = child.stdin.take().expect("stdin piped");
        for line in requests {
            writeln!(stdin, "{line}").unwrap();
        }
    }

    let output = child.wait_with_output().expect("failed to wait on slamy mcp");
    assert!(output.status.success(), "stdin EOF should end the server cleanly");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("stdout must carry only JSON-RPC"))
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 9);

    let failed = &responses[2]["result"];
    assert_eq!(failed["isError"], true);
    assert!(
        failed["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("SLACK_BOT_TOKEN"),
        "got: {failed}"
    );
}
