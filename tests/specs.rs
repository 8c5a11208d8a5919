// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box end-to-end tests against the real `mgd` binary: boot the
//! daemon as a child process, drive it over HTTP exactly as an
//! external client would, and assert on the externally observable
//! contract (§6/§8). Unit- and module-level coverage of the
//! individual collaborators lives in their own crates; this suite
//! only exercises what's reachable from outside the process boundary.

use assert_cmd::Command as AssertCommand;
use std::io::Write;
use std::process::{Child, Stdio};
use std::time::Duration;

/// Wraps a spawned `mgd` child so it's always killed, even on panic
/// partway through a test.
struct DaemonGuard {
    child: Child,
    base_url: String,
}

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

/// Writes a fixture model-server script that answers `GET /health`
/// with 200 and echoes any POST body back verbatim, so proxy tests
/// can assert on body preservation without a real inference backend.
fn write_fixture_server(dir: &std::path::Path) -> std::path::PathBuf {
    let script = dir.join("fixture_server.py");
    let mut f = std::fs::File::create(&script).unwrap();
    f.write_all(
        br#"
import sys, http.server

class Handler(http.server.BaseHTTPRequestHandler):
    def log_message(self, *a):
        pass

    def do_GET(self):
        self.send_response(200)
        self.send_header("Content-Type", "application/json")
        self.end_headers()
        self.wfile.write(b'{"status":"ok"}')

    def do_POST(self):
        length = int(self.headers.get("Content-Length", 0))
        body = self.rfile.read(length)
        self.send_response(200)
        self.send_header("Content-Type", "application/json")
        self.end_headers()
        self.wfile.write(body)

port = int(sys.argv[1])
http.server.HTTPServer(("127.0.0.1", port), Handler).serve_forever()
"#,
    )
    .unwrap();
    script
}

fn start_daemon(state_dir: &std::path::Path, config_yaml: &str) -> DaemonGuard {
    let config_path = state_dir.join("gateway.yaml");
    std::fs::write(&config_path, config_yaml).unwrap();

    let port = free_port();
    let base_url = format!("http://127.0.0.1:{port}");

    // assert_cmd locates (and builds, if needed) the `mgd` binary across
    // the workspace rather than relying on CARGO_BIN_EXE_mgd, which is
    // only set for tests that live in mg-daemon's own package. `Command`
    // derefs to `std::process::Command`, so `.spawn()` below resolves
    // through the deref chain.
    let mut cmd = AssertCommand::cargo_bin("mgd").unwrap();
    let child = cmd
        .env("MG_STATE_DIR", state_dir)
        .env("MG_CONFIG", &config_path)
        .env("MG_LISTEN", format!("127.0.0.1:{port}"))
        .env("RUST_LOG", "warn")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn mgd");

    DaemonGuard { child, base_url }
}

async fn wait_until_healthy(base_url: &str) {
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("daemon never became healthy at {base_url}");
}

#[test]
fn version_flag_reports_package_version() {
    AssertCommand::cargo_bin("mgd").unwrap().arg("--version").assert().success();
}

#[test]
fn unexpected_argument_exits_nonzero() {
    AssertCommand::cargo_bin("mgd").unwrap().arg("--bogus-flag").assert().failure();
}

#[tokio::test]
async fn health_and_empty_model_list_on_a_bare_config() {
    let tmp = tempfile::tempdir().unwrap();
    let daemon = start_daemon(tmp.path(), "models: {}\n");
    wait_until_healthy(&daemon.base_url).await;

    let client = reqwest::Client::new();
    let health: serde_json::Value = client.get(format!("{}/health", daemon.base_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["modelsTotal"], 0);

    let models: serde_json::Value = client.get(format!("{}/v1/models", daemon.base_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(models["data"].as_array().unwrap().len(), 0);

    let running: serde_json::Value = client.get(format!("{}/running", daemon.base_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(running["models"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn options_preflight_gets_permissive_cors_headers() {
    let tmp = tempfile::tempdir().unwrap();
    let daemon = start_daemon(tmp.path(), "models: {}\n");
    wait_until_healthy(&daemon.base_url).await;

    let client = reqwest::Client::new();
    let resp = client.request(reqwest::Method::OPTIONS, format!("{}/v1/models", daemon.base_url)).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(resp.headers().get("access-control-max-age").unwrap(), "86400");
}

#[tokio::test]
async fn api_key_gate_rejects_missing_key_and_accepts_bearer() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("settings.json"), r#"{"requireApiKey":true,"apiKey":"secret123"}"#).unwrap();
    let daemon = start_daemon(tmp.path(), "models: {}\n");
    wait_until_healthy(&daemon.base_url).await;

    let client = reqwest::Client::new();

    // Settings endpoint stays reachable without a key so a fresh UI can
    // discover the auth requirement before it has a key to send.
    let settings_resp = client.get(format!("{}/api/settings/system", daemon.base_url)).send().await.unwrap();
    assert!(settings_resp.status().is_success());

    let unauthed = client.get(format!("{}/v1/models", daemon.base_url)).send().await.unwrap();
    assert_eq!(unauthed.status(), reqwest::StatusCode::UNAUTHORIZED);

    let authed =
        client.get(format!("{}/v1/models", daemon.base_url)).bearer_auth("secret123").send().await.unwrap();
    assert!(authed.status().is_success());
}

#[tokio::test]
async fn proxy_preserves_body_bytes_to_a_real_spawned_upstream() {
    let tmp = tempfile::tempdir().unwrap();
    let fixture = write_fixture_server(tmp.path());

    let config = format!(
        r#"
models:
  fixture:
    cmd: "python3 {script} ${{PORT}}"
    proxyUrl: "http://127.0.0.1:${{PORT}}"
"#,
        script = fixture.display()
    );
    let daemon = start_daemon(tmp.path(), &config);
    wait_until_healthy(&daemon.base_url).await;

    let client = reqwest::Client::new();
    let body = serde_json::json!({
        "model": "fixture",
        "messages": [{"role": "user", "content": "hello"}],
    });
    let resp = client
        .post(format!("{}/v1/chat/completions", daemon.base_url))
        .json(&body)
        .timeout(Duration::from_secs(30))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success(), "status: {}", resp.status());

    let echoed: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(echoed["messages"][0]["content"], "hello");
}

#[tokio::test]
async fn unload_then_running_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let fixture = write_fixture_server(tmp.path());

    let config = format!(
        r#"
models:
  fixture:
    cmd: "python3 {script} ${{PORT}}"
    proxyUrl: "http://127.0.0.1:${{PORT}}"
"#,
        script = fixture.display()
    );
    let daemon = start_daemon(tmp.path(), &config);
    wait_until_healthy(&daemon.base_url).await;

    let client = reqwest::Client::new();
    let body = serde_json::json!({"model": "fixture", "messages": []});
    let _ = client.post(format!("{}/v1/chat/completions", daemon.base_url)).json(&body).send().await.unwrap();

    let unload_resp = client.get(format!("{}/unload", daemon.base_url)).send().await.unwrap();
    assert!(unload_resp.status().is_success());

    let running: serde_json::Value = client.get(format!("{}/running", daemon.base_url)).send().await.unwrap().json().await.unwrap();
    assert_eq!(running["models"].as_array().unwrap().len(), 0);
}
